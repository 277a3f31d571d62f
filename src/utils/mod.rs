//! Utility modules for the M3U aggregator
//!
//! - `utils::normalizer` for channel name normalization
//! - `utils::url` for locator detection and credential-safe logging

pub mod normalizer;
pub mod url;

pub use normalizer::{NormalizedKey, Normalizer};
pub use url::UrlUtils;
