//! Centralized error handling for the M3U aggregator
//!
//! Errors are split by the layer that raises them so callers can decide what
//! is recoverable:
//!
//! - **Catalog Errors**: the channel catalog could not be loaded or indexed.
//!   These are fatal, nothing can be matched without a catalog.
//! - **Source Errors**: a single upstream playlist could not be fetched. The
//!   run skips that source and carries on with the rest.
//! - **Configuration Errors**: invalid settings detected before the run starts.
//!
//! # Usage
//!
//! ```rust
//! use m3u_aggregator::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("validation.concurrency must be at least 1"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Catalog Results
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
