//! URL standardization strategies.
//!
//! Every lookup-key comparison in the index goes through one of these.
//! The strategy is injected into [`RedirectIndex`](crate::rules::RedirectIndex)
//! at construction; nothing reaches for a global instance.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Canonicalizes a URL for comparison purposes.
pub trait UrlStandardizer: Send + Sync + std::fmt::Debug {
    /// Returns the canonical form of `url`.
    fn standardize(&self, url: &str) -> String;

    /// Absent input stays absent.
    fn standardize_opt(&self, url: Option<&str>) -> Option<String> {
        url.map(|u| self.standardize(u))
    }
}

/// Lower-cases and drops trailing slashes when there is no query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStandardizer;

impl UrlStandardizer for DefaultStandardizer {
    fn standardize(&self, url: &str) -> String {
        // All trailing slashes go, so the result is stable under re-application.
        let trimmed = if url.ends_with('/') && !url.contains('?') {
            url.trim_end_matches('/')
        } else {
            url
        };
        trimmed.to_lowercase()
    }
}

/// Lower-case only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToLowerStandardizer;

impl UrlStandardizer for ToLowerStandardizer {
    fn standardize(&self, url: &str) -> String {
        url.to_lowercase()
    }
}

/// No transformation.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityStandardizer;

impl UrlStandardizer for IdentityStandardizer {
    fn standardize(&self, url: &str) -> String {
        url.to_string()
    }
}

/// Configurable selection of a built-in strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StandardizerKind {
    #[default]
    Default,
    Lowercase,
    Identity,
}

impl StandardizerKind {
    pub fn build(self) -> Arc<dyn UrlStandardizer> {
        match self {
            StandardizerKind::Default => Arc::new(DefaultStandardizer),
            StandardizerKind::Lowercase => Arc::new(ToLowerStandardizer),
            StandardizerKind::Identity => Arc::new(IdentityStandardizer),
        }
    }
}
