use chrono::{DateTime, Utc};
use feed_rs::parser;
use serde::{Deserialize, Serialize};

use super::FetchError;

/// The newest entry of a feed, as republished and as persisted for dedup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub link: String,
    /// Entry summary, which is usually HTML.
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
}

/// Parses RSS/Atom bytes and returns the first entry in document order.
pub fn parse_first_entry(bytes: &[u8]) -> Result<FeedEntry, FetchError> {
    let feed = parser::parse(bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

    let entry = feed.entries.into_iter().next().ok_or(FetchError::EmptyFeed)?;

    let link = entry
        .links
        .first()
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
        .ok_or(FetchError::MissingLink)?;
    let title = entry.title.map(|t| t.content).unwrap_or_default();
    let description = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .unwrap_or_default();

    Ok(FeedEntry {
        id: entry.id,
        title,
        link,
        description,
        published: entry.published.or(entry.updated),
    })
}
