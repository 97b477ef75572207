//! Not-found redirect resolution.
//!
//! Resolves a URL that produced a 404 to a replacement target using
//! administrator-defined redirect rules: exact lookups over several legacy
//! URL shapes, prefix fallback, then tail append and query merge.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod rules;
pub mod standardizer;

pub use config::RedirectConfig;
pub use error::{IndexError, ResolveError};
pub use lifecycle::RedirectTable;
pub use routing::{MatchResolver, RequestUrl, ResolvedRedirect, UrlRewriter};
pub use rules::{RedirectIndex, RedirectRule, RuleState};
pub use standardizer::{StandardizerKind, UrlStandardizer};
