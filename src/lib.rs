//! Republish the newest entry of an RSS/Atom feed as a Mastodon status.
//!
//! A run fetches the feed, skips entries it has already seen, cleans up the
//! entry text, optionally translates it with DeepL and posts it.

pub mod config;
pub mod content;
pub mod feed;
pub mod pipeline;
pub mod publish;
pub mod storage;
pub mod util;
