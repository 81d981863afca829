use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::StatusPayload;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Publish request timed out")]
    Timeout,
    #[error("Publish API returned status {0}")]
    HttpStatus(u16),
    #[error("Invalid publish response: {0}")]
    Decode(String),
}

/// The parts of a created status worth logging.
///
/// Any JSON body counts as a created status. Fields missing from it, or of an
/// unexpected type, are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostedStatus {
    pub id: Option<String>,
    pub url: Option<String>,
}

impl PostedStatus {
    fn from_json(value: &Value) -> Self {
        Self {
            id: value.get("id").and_then(scalar_string),
            url: value.get("url").and_then(scalar_string),
        }
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Client for a Mastodon-compatible statuses endpoint.
pub struct Publisher {
    client: reqwest::Client,
    api_url: Url,
    api_key: SecretString,
    timeout: Duration,
}

impl Publisher {
    pub fn new(
        client: reqwest::Client,
        api_url: Url,
        api_key: SecretString,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            api_url,
            api_key,
            timeout,
        }
    }

    /// Posts `payload` as form data. Only `200 OK` counts as success.
    pub async fn publish(&self, payload: &StatusPayload) -> Result<PostedStatus, PublishError> {
        let request = self
            .client
            .post(self.api_url.as_str())
            .header(
                reqwest::header::AUTHORIZATION,
                self.api_key.expose_secret(),
            )
            .form(payload);

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| PublishError::Timeout)?
            .map_err(PublishError::Network)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::error!(status = status.as_u16(), "Publish request rejected");
            return Err(PublishError::HttpStatus(status.as_u16()));
        }

        let body = tokio::time::timeout(self.timeout, response.bytes())
            .await
            .map_err(|_| PublishError::Timeout)?
            .map_err(PublishError::Network)?;
        let value: Value =
            serde_json::from_slice(&body).map_err(|e| PublishError::Decode(e.to_string()))?;
        let posted = PostedStatus::from_json(&value);

        tracing::info!(
            id = posted.id.as_deref().unwrap_or("-"),
            url = posted.url.as_deref().unwrap_or("-"),
            "Status published"
        );
        Ok(posted)
    }
}
