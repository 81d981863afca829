use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Translation request timed out")]
    Timeout,
    #[error("Translation API returned status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("Invalid translation response: {0}")]
    Decode(String),
    #[error("Translation response contained no translations")]
    EmptyResponse,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
}

/// Client for a DeepL-compatible `/v2/translate` endpoint.
pub struct Translator {
    client: reqwest::Client,
    api_url: Url,
    api_key: SecretString,
    target_language: String,
    timeout: Duration,
}

impl Translator {
    pub fn new(
        client: reqwest::Client,
        api_url: Url,
        api_key: SecretString,
        target_language: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            api_url,
            api_key,
            target_language: target_language.into(),
            timeout,
        }
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Translates `text` into the configured target language.
    ///
    /// The key travels both as the `auth_key` form field and as the
    /// `Authorization` header, so legacy and current DeepL plans accept it.
    pub async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let key = self.api_key.expose_secret();
        let form = [
            ("text", text),
            ("target_lang", self.target_language.as_str()),
            ("auth_key", key),
        ];

        let request = self
            .client
            .post(self.api_url.as_str())
            .header(reqwest::header::AUTHORIZATION, key)
            .form(&form);

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| TranslateError::Timeout)?
            .map_err(TranslateError::Network)?;

        let status = response.status();
        let body = tokio::time::timeout(self.timeout, response.text())
            .await
            .map_err(|_| TranslateError::Timeout)?
            .map_err(TranslateError::Network)?;

        if status != reqwest::StatusCode::OK {
            tracing::error!(status = status.as_u16(), body = %body, "Translation request rejected");
            return Err(TranslateError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranslateResponse =
            serde_json::from_str(&body).map_err(|e| TranslateError::Decode(e.to_string()))?;
        let first = parsed
            .translations
            .into_iter()
            .next()
            .ok_or(TranslateError::EmptyResponse)?;

        tracing::info!(
            target_lang = %self.target_language,
            source_lang = first.detected_source_language.as_deref().unwrap_or("unknown"),
            "Translated status text"
        );
        Ok(first.text)
    }
}
