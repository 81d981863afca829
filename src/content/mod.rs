//! Turning a feed entry into status text.
//!
//! - [`markers`] - Named marker tables for bridged Twitter/Weibo content
//! - [`normalize`] - Share detection, HTML stripping and marker cleanup
//! - [`translate`] - Optional DeepL translation of the cleaned text

pub mod markers;
mod normalize;
mod translate;

pub use markers::ShareKind;
pub use normalize::{
    detect_shares, extract_headline, html_to_text, normalize, Mode, Normalized, Share,
    ShareMatch,
};
pub use translate::{TranslateError, Translator};
