use scraper::Html;
use std::borrow::Cow;

use super::markers::{
    ShareKind, DROPPED_CHARS, HANDLE_PATTERN, HEADLINE_BRACKETS, RESIDUAL_MARKERS,
    SHARE_MARKERS, SPACED_CHARS,
};
use crate::feed::FeedEntry;

/// Which entry field becomes the status body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Title,
    #[default]
    Description,
}

impl From<&str> for Mode {
    /// `"title"` selects the title; anything else selects the description.
    fn from(value: &str) -> Self {
        if value == "title" {
            Mode::Title
        } else {
            Mode::Description
        }
    }
}

/// A share marker together with the handle it credits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    pub kind: ShareKind,
    pub handle: String,
}

/// Outcome of looking for a handle after a share marker matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareMatch {
    Found(Share),
    /// The marker is present but the title holds no `@handle` token.
    MissingHandle(ShareKind),
}

/// Status text ready for translation, plus who it should be credited to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub shares: Vec<ShareMatch>,
}

impl Normalized {
    /// Shares with a usable handle, in detection order.
    pub fn credited(&self) -> impl Iterator<Item = &Share> {
        self.shares.iter().filter_map(|m| match m {
            ShareMatch::Found(share) => Some(share),
            ShareMatch::MissingHandle(_) => None,
        })
    }
}

/// Turns a feed entry into plain status text.
pub fn normalize(entry: &FeedEntry, mode: Mode) -> Normalized {
    let (title, shares) = detect_shares(&entry.title);

    let body = match mode {
        Mode::Title => title.as_str(),
        Mode::Description => entry.description.as_str(),
    };

    let headline = extract_headline(body);
    let scrubbed = scrub_chars(&html_to_text(headline));
    let text = strip_residual_markers(&scrubbed);

    Normalized {
        text: text.trim().to_string(),
        shares,
    }
}

/// Finds share markers in `title` and strips the credited handles from it.
///
/// Markers are checked in [`SHARE_MARKERS`] order, each against the title as
/// left by the previous one. The bare handle (without `@`) is removed
/// everywhere it occurs.
pub fn detect_shares(title: &str) -> (String, Vec<ShareMatch>) {
    let mut working = title.to_string();
    let mut shares = Vec::new();

    for &(marker, kind) in SHARE_MARKERS {
        if !working.contains(marker) {
            continue;
        }

        let handle = HANDLE_PATTERN
            .find(&working)
            .map(|m| m.as_str().trim_start_matches('@').to_string());

        match handle {
            Some(handle) => {
                tracing::info!(kind = ?kind, handle = %handle, "Share marker found");
                working = working.replace(&handle, "");
                shares.push(ShareMatch::Found(Share { kind, handle }));
            }
            None => {
                tracing::warn!(kind = ?kind, title = %title, "Share marker without a handle");
                shares.push(ShareMatch::MissingHandle(kind));
            }
        }
    }

    (working, shares)
}

/// Keeps only the bracketed headline when `text` opens with one.
///
/// A missing closing bracket keeps everything after the opener.
pub fn extract_headline(text: &str) -> &str {
    for &(open, close) in HEADLINE_BRACKETS {
        if let Some(rest) = text.strip_prefix(open) {
            tracing::debug!("Bracketed headline detected");
            return rest.split(close).next().unwrap_or(rest);
        }
    }
    text
}

/// Reduces an HTML fragment to its text content, decoding entities.
pub fn html_to_text(html: &str) -> String {
    if !html.contains(['<', '&']) {
        return html.to_string();
    }
    let fragment = Html::parse_fragment(html);
    fragment.root_element().text().collect()
}

fn scrub_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !DROPPED_CHARS.contains(c))
        .map(|c| if SPACED_CHARS.contains(&c) { ' ' } else { c })
        .collect()
}

fn strip_residual_markers(text: &str) -> Cow<'_, str> {
    let mut out = Cow::Borrowed(text);
    for marker in RESIDUAL_MARKERS {
        if out.contains(marker) {
            out = Cow::Owned(out.replace(marker, ""));
        }
    }
    out
}
