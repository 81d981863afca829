//! Integration tests for CLI argument handling and exit codes.

use std::process::Command;

/// Run the CLI in a scratch directory with no publishing settings in scope.
fn run_cli(args: &[&str]) -> std::process::Output {
    let dir = tempfile::tempdir().unwrap();
    Command::new(env!("CARGO_BIN_EXE_rsstoot"))
        .args(args)
        .current_dir(dir.path())
        .env_remove("MASTODON_API_URL")
        .env_remove("MASTODON_API_KEY")
        .env_remove("TRANSLATION_ENABLED")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute rsstoot")
}

#[test]
fn test_missing_arguments_exit_1_with_usage() {
    let output = run_cli(&[]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr was: {}", stderr);
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rsstoot"));
    assert!(stdout.contains("FEED_URL"));
    assert!(stdout.contains("--cache-dir"));
}

#[test]
fn test_version_flag_exits_successfully() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_publish_settings_exit_1() {
    let output = run_cli(&["https://example.com/feed.xml", "title"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("publish.api_url"), "stderr was: {}", stderr);
}

#[test]
fn test_invalid_config_file_exit_1() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("broken.toml");
    std::fs::write(&config, "this is not [valid toml").unwrap();

    let output = run_cli(&[
        "https://example.com/feed.xml",
        "--config",
        config.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid TOML"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_publish_rejected_exit_1() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<?xml version="1.0"?><rss version="2.0"><channel><title>t</title>
<item><title>post</title><link>https://example.com/1</link><description>Hello</description></item>
</channel></rss>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/statuses"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let feed_url = format!("{}/feed", server.uri());
    let output = Command::new(env!("CARGO_BIN_EXE_rsstoot"))
        .arg(&feed_url)
        .arg("--cache-dir")
        .arg(dir.path().join("cache"))
        .current_dir(dir.path())
        .env("MASTODON_API_URL", format!("{}/api/v1/statuses", server.uri()))
        .env("MASTODON_API_KEY", "Bearer test")
        .env_remove("TRANSLATION_ENABLED")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute rsstoot");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("403"), "stderr was: {}", stderr);
}
