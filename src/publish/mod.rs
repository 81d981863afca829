//! Publishing the status to a Mastodon-compatible API.
//!
//! - [`status`] - Prefixing and truncating the final status text
//! - [`mastodon`] - The HTTP client for the statuses endpoint

mod mastodon;
mod status;

use serde::{Deserialize, Serialize};

pub use mastodon::{PostedStatus, PublishError, Publisher};
pub use status::{compose_status, StatusPayload};

/// Audience of a published status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Unlisted,
    Private,
    Direct,
}
