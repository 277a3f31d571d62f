//! Error type definitions for the M3U aggregator

use std::path::PathBuf;

use thiserror::Error;

use crate::models::Lcn;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Channel catalog errors (always fatal)
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Upstream playlist errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Output sink errors
    #[error("Output error: {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised while loading or indexing the channel catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog file could not be read
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not valid catalog JSON
    #[error("Failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The catalog contains no channels
    #[error("Catalog contains no channels")]
    Empty,

    /// Two records share the same logical channel number
    #[error("Duplicate channel number {lcn} ('{first}' and '{second}')")]
    DuplicateIdentity {
        lcn: Lcn,
        first: String,
        second: String,
    },

    /// Two different records normalize to the same lookup key
    #[error("Key '{key}' is claimed by channel {first} and channel {second}")]
    KeyCollision { key: String, first: Lcn, second: Lcn },
}

/// Errors raised while fetching an upstream playlist
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network connection timeouts
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Connection or protocol failures
    #[error("Request failed: {url} - {message}")]
    Request { url: String, message: String },

    /// Non-success HTTP status from the source
    #[error("HTTP error: {status} - {url}")]
    Http { status: u16, url: String },

    /// Body could not be read or decoded
    #[error("Failed to read body: {url} - {message}")]
    Body { url: String, message: String },

    /// Locator scheme is not http(s) or file
    #[error("Unsupported locator: {url}")]
    UnsupportedLocator { url: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an output error for the given path
    pub fn output<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }
}

impl CatalogError {
    /// Create an I/O error for the given catalog path
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error for the given catalog path
    pub fn parse<P: Into<PathBuf>>(path: P, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}

impl SourceError {
    /// Create a timeout error
    pub fn timeout<U: Into<String>>(url: U) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Create a request failed error
    pub fn request<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Request {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http<U: Into<String>>(status: u16, url: U) -> Self {
        Self::Http {
            status,
            url: url.into(),
        }
    }

    /// Create a body read error
    pub fn body<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Body {
            url: url.into(),
            message: message.into(),
        }
    }
}
