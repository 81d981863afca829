use serde::Serialize;

use super::Visibility;
use crate::content::Normalized;
use crate::util::truncate_chars;

/// Form body of a status post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusPayload {
    pub link: String,
    pub status: String,
    pub visibility: Visibility,
}

/// Builds the final status text.
///
/// Credited shares are prefixed in detection order, each wrapping the
/// previous result. Translated text gets the locale-specific prefixes,
/// untranslated text gets the English ones. The result is capped at
/// `max_chars` characters.
pub fn compose_status(
    normalized: &Normalized,
    body: &str,
    translated: bool,
    max_chars: usize,
) -> String {
    let mut status = body.to_string();

    // Each share keeps its own handle, even when a title carries both markers.
    for share in normalized.credited() {
        status = if translated {
            format!("{}{} {}", share.kind.translated_prefix(), share.handle, status)
        } else {
            format!("{}{}{}", share.kind.plain_prefix(), share.handle, status)
        };
    }

    truncate_chars(&status, max_chars).into_owned()
}
