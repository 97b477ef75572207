//! Error types for resolution and index maintenance.
//!
//! A request that matches nothing, or matches an ignored rule, is not an
//! error: those surface as `Ok(None)`.

use thiserror::Error;

/// Errors reported to callers of the resolver.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// A required argument was absent or empty.
    #[error("Missing required argument: {0}")]
    InvalidArgument(&'static str),

    /// The request is neither an absolute URL nor a rooted path.
    #[error("Invalid request URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Errors from positional index access.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("Position {index} out of bounds for {len} rules")]
    OutOfBounds { index: usize, len: usize },
}
