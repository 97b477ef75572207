//! Requested URL representation.

use std::fmt;

use url::{Position, Url};

use crate::error::ResolveError;

/// The URL a client asked for and did not find.
///
/// Either a full absolute URL or a rooted path with an optional query.
/// Fragments are dropped in both cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestUrl {
    Absolute(Url),
    Relative { path: String, query: Option<String> },
}

impl RequestUrl {
    /// Parse an absolute URL or a path starting with `/`.
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ResolveError::InvalidArgument("requested_url"));
        }

        match Url::parse(raw) {
            Ok(url) => Ok(Self::Absolute(url)),
            Err(url::ParseError::RelativeUrlWithoutBase) if raw.starts_with('/') => {
                let without_fragment = raw.split('#').next().unwrap_or(raw);
                let (path, query) = match without_fragment.split_once('?') {
                    Some((path, query)) => (path, Some(query.to_string())),
                    None => (without_fragment, None),
                };
                Ok(Self::Relative {
                    path: path.to_string(),
                    query,
                })
            }
            Err(e) => Err(ResolveError::InvalidUrl {
                url: raw.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self, Self::Absolute(_))
    }

    /// Full URL including query, for absolute requests.
    pub fn absolute_uri(&self) -> Option<&str> {
        match self {
            Self::Absolute(url) => Some(&url[..Position::AfterQuery]),
            Self::Relative { .. } => None,
        }
    }

    /// Full URL without query, for absolute requests.
    pub fn absolute_without_query(&self) -> Option<&str> {
        match self {
            Self::Absolute(url) => Some(&url[..Position::AfterPath]),
            Self::Relative { .. } => None,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Absolute(url) => url.path(),
            Self::Relative { path, .. } => path,
        }
    }

    /// Query string without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        match self {
            Self::Absolute(url) => url.query(),
            Self::Relative { query, .. } => query.as_deref(),
        }
    }

    pub fn path_and_query(&self) -> String {
        match self.query() {
            Some(query) => format!("{}?{}", self.path(), query),
            None => self.path().to_string(),
        }
    }
}

impl From<Url> for RequestUrl {
    fn from(url: Url) -> Self {
        Self::Absolute(url)
    }
}

impl fmt::Display for RequestUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.absolute_uri() {
            Some(uri) => f.write_str(uri),
            None => f.write_str(&self.path_and_query()),
        }
    }
}
