//! One run: fetch → dedupe → normalize → translate → publish.
use secrecy::SecretString;
use std::time::Duration;
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::content::{normalize, Mode, ShareMatch, TranslateError, Translator};
use crate::feed::{fetch_latest, FeedEntry, FetchError};
use crate::publish::{
    compose_status, PostedStatus, PublishError, Publisher, StatusPayload, Visibility,
};
use crate::storage::{Freshness, SeenStore, StoreError};
use crate::util::validate_url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to fetch feed: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Translation failed: {0}")]
    Translate(#[from] TranslateError),
    #[error("Publishing failed: {0}")]
    Publish(#[from] PublishError),
}

/// How a successful run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The newest entry was already published by an earlier run.
    NoNewData { link: String },
    Published { link: String, status: PostedStatus },
}

/// Builds the shared HTTP client.
pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}

/// The configured stages for republishing one feed.
pub struct Pipeline {
    client: reqwest::Client,
    store: SeenStore,
    translator: Option<Translator>,
    publisher: Publisher,
    visibility: Visibility,
    max_status_chars: usize,
    commit_after_publish: bool,
    timeout: Duration,
}

impl Pipeline {
    /// Validates `config` and constructs every stage from it.
    pub fn from_config(config: &Config, client: reqwest::Client) -> Result<Self, ConfigError> {
        config.validate()?;
        let timeout = config.request_timeout();

        let publish_url = config
            .publish
            .api_url
            .as_deref()
            .ok_or(ConfigError::Missing("publish.api_url"))?;
        let publish_key = config
            .publish
            .api_key
            .clone()
            .ok_or(ConfigError::Missing("publish.api_key"))?;
        let publisher = Publisher::new(
            client.clone(),
            parse_endpoint("publish.api_url", publish_url)?,
            SecretString::from(publish_key),
            timeout,
        );

        let translator = if config.translation.enabled {
            let key = config
                .translation
                .api_key
                .clone()
                .ok_or(ConfigError::Missing("translation.api_key"))?;
            let target = config
                .translation
                .target_language
                .clone()
                .ok_or(ConfigError::Missing("translation.target_language"))?;
            Some(Translator::new(
                client.clone(),
                parse_endpoint("translation.api_url", &config.translation.api_url)?,
                SecretString::from(key),
                target,
                timeout,
            ))
        } else {
            None
        };

        Ok(Self {
            client,
            store: SeenStore::new(&config.cache_dir),
            translator,
            publisher,
            visibility: config.publish.visibility,
            max_status_chars: config.max_status_chars,
            commit_after_publish: config.commit_after_publish,
            timeout,
        })
    }

    pub fn store(&self) -> &SeenStore {
        &self.store
    }

    /// Republishes the newest entry of `feed_url` unless it was seen before.
    ///
    /// Unless `commit_after_publish` is set, the entry is recorded as seen
    /// before translation and publishing, so a failed publish is not retried
    /// by the next run.
    pub async fn run(&self, feed_url: &str, mode: Mode) -> Result<RunOutcome, PipelineError> {
        let entry = fetch_latest(&self.client, feed_url, self.timeout).await?;

        match self.store.check(feed_url, &entry)? {
            Freshness::Unchanged => {
                tracing::info!(feed = %feed_url, link = %entry.link, "No new data");
                return Ok(RunOutcome::NoNewData { link: entry.link });
            }
            Freshness::FirstRun => {
                tracing::info!(feed = %feed_url, link = %entry.link, "First run for feed");
            }
            Freshness::Changed { previous_link } => {
                tracing::info!(
                    feed = %feed_url,
                    link = %entry.link,
                    previous = %previous_link,
                    "New data"
                );
            }
        }

        if !self.commit_after_publish {
            self.store.commit(feed_url, &entry)?;
        }

        let status = self.compose(&entry, mode).await?;
        let payload = StatusPayload {
            link: entry.link.clone(),
            status,
            visibility: self.visibility,
        };
        let posted = self.publisher.publish(&payload).await?;

        if self.commit_after_publish {
            self.store.commit(feed_url, &entry)?;
        }

        Ok(RunOutcome::Published {
            link: entry.link,
            status: posted,
        })
    }

    async fn compose(&self, entry: &FeedEntry, mode: Mode) -> Result<String, TranslateError> {
        let normalized = normalize(entry, mode);
        for share in &normalized.shares {
            if let ShareMatch::MissingHandle(kind) = share {
                tracing::warn!(kind = ?kind, "Publishing without attribution");
            }
        }
        tracing::info!(mode = ?mode, text = %normalized.text, "Normalized entry");

        let (body, translated) = match &self.translator {
            Some(translator) => (translator.translate(&normalized.text).await?, true),
            None => {
                tracing::info!("Translation disabled");
                (normalized.text.clone(), false)
            }
        };

        Ok(compose_status(
            &normalized,
            &body,
            translated,
            self.max_status_chars,
        ))
    }
}

fn parse_endpoint(key: &'static str, value: &str) -> Result<url::Url, ConfigError> {
    validate_url(value).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}
