//! Recognized textual markers in bridged social-media feeds.
//!
//! Twitter bridges (Nitter, RSSHub) flag retweets and replies in entry titles;
//! Weibo-style sources wrap the headline of a post in full-width brackets and
//! pad text with characters that do not survive republishing. Everything the
//! normalizer matches against lives here.

use regex::Regex;
use std::sync::LazyLock;

/// Title marker of a retweet ("RT by @alice: ...").
pub const REPOST_MARKER: &str = "RT ";

/// Title marker of a reply ("R to @bob: ...").
pub const REPLY_MARKER: &str = "R to @";

/// Kind of share a title marker announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareKind {
    Repost,
    Reply,
}

impl ShareKind {
    /// Prefix used when the status text is left untranslated.
    pub fn plain_prefix(self) -> &'static str {
        match self {
            ShareKind::Repost => "Repost from ",
            ShareKind::Reply => "Comment from ",
        }
    }

    /// Prefix used when the status text went through translation.
    pub fn translated_prefix(self) -> &'static str {
        match self {
            ShareKind::Repost => "转发",
            ShareKind::Reply => "评论",
        }
    }
}

/// Share markers in the order they are checked.
pub const SHARE_MARKERS: &[(&str, ShareKind)] = &[
    (REPOST_MARKER, ShareKind::Repost),
    (REPLY_MARKER, ShareKind::Reply),
];

/// First `@handle` token in a title.
pub static HANDLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@\w+").unwrap());

/// Bracket pairs whose leading occurrence marks the headline of a post.
pub const HEADLINE_BRACKETS: &[(char, char)] = &[('【', '】')];

/// Characters deleted from plain text.
pub const DROPPED_CHARS: &[char] = &['#', '\u{200B}', '@'];

/// Characters replaced by an ASCII space in plain text.
pub const SPACED_CHARS: &[char] = &['\u{3000}'];

/// Substrings removed after HTML stripping.
pub const RESIDUAL_MARKERS: &[&str] = &["#", "RT by", "R to"];
