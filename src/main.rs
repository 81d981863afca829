use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use rsstoot::config::Config;
use rsstoot::content::Mode;
use rsstoot::pipeline::{http_client, Pipeline, RunOutcome};

#[derive(Parser, Debug)]
#[command(
    name = "rsstoot",
    version,
    about = "Republish the newest RSS/Atom entry as a Mastodon status"
)]
struct Args {
    /// RSS or Atom feed URL
    feed_url: String,

    /// "title" posts the entry title, anything else posts the description
    #[arg(default_value = "description")]
    mode: String,

    /// TOML config file (optional; environment variables take precedence)
    #[arg(long, value_name = "FILE", default_value = "rsstoot.toml")]
    config: PathBuf,

    /// Directory for seen-entry records
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Usage errors exit 1; --help and --version exit 0
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(args).await {
        Ok(RunOutcome::NoNewData { .. }) => {
            println!("No new data");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Published { link, .. }) => {
            println!("Published {}", link);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<RunOutcome> {
    if let Err(e) = dotenv::dotenv() {
        tracing::debug!(error = %e, "No .env file loaded");
    }

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config '{}'", args.config.display()))?
        .with_env();
    if let Some(dir) = args.cache_dir {
        config.cache_dir = dir;
    }
    tracing::debug!(config = ?config, "Resolved configuration");

    let client = http_client().context("Failed to build HTTP client")?;
    let pipeline = Pipeline::from_config(&config, client).context("Invalid configuration")?;

    let mode = Mode::from(args.mode.as_str());
    let outcome = pipeline
        .run(&args.feed_url, mode)
        .await
        .with_context(|| format!("Run failed for feed '{}'", args.feed_url))?;
    Ok(outcome)
}
