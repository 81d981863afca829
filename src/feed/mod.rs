//! Feed retrieval: one HTTP GET, then the first entry of the parsed feed.
//!
//! - [`fetcher`] - HTTP fetching with a liveness check and size limit
//! - [`parser`] - RSS/Atom parsing using the `feed-rs` crate

mod fetcher;
mod parser;

pub use fetcher::{fetch_latest, FetchError};
pub use parser::{parse_first_entry, FeedEntry};
