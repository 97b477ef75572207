//! Redirect rule definitions.

use serde::{Deserialize, Serialize};

/// Administrative state of a redirect rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleState {
    /// Active rule.
    #[default]
    Saved,
    /// Matching this rule suppresses any redirect.
    Ignored,
    /// Proposed from 404 traffic, not yet reviewed. Resolves like `Saved`.
    Suggestion,
    /// Soft-deleted. Never loaded into an index.
    Deleted,
}

/// One configured redirect.
///
/// Rules are immutable once built; resolution derives a fresh
/// [`ResolvedRedirect`](crate::routing::ResolvedRedirect) instead of editing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRule {
    old_url: String,
    new_url: String,
    exact_match: bool,
    append_match_to_new_url: bool,
    include_query_string: bool,
    state: RuleState,
}

impl RedirectRule {
    /// Create a saved rule with all flags off.
    pub fn new(old_url: impl Into<String>, new_url: impl Into<String>) -> Self {
        Self {
            old_url: old_url.into(),
            new_url: new_url.into(),
            exact_match: false,
            append_match_to_new_url: false,
            include_query_string: false,
            state: RuleState::Saved,
        }
    }

    pub fn with_exact_match(mut self, exact_match: bool) -> Self {
        self.exact_match = exact_match;
        self
    }

    pub fn with_append_match(mut self, append: bool) -> Self {
        self.append_match_to_new_url = append;
        self
    }

    pub fn with_include_query_string(mut self, include: bool) -> Self {
        self.include_query_string = include;
        self
    }

    pub fn with_state(mut self, state: RuleState) -> Self {
        self.state = state;
        self
    }

    /// The key URL as configured.
    pub fn old_url(&self) -> &str {
        &self.old_url
    }

    /// The configured target.
    pub fn new_url(&self) -> &str {
        &self.new_url
    }

    /// Only satisfies exact lookups, never prefix fallback.
    pub fn exact_match(&self) -> bool {
        self.exact_match
    }

    pub fn append_match_to_new_url(&self) -> bool {
        self.append_match_to_new_url
    }

    pub fn include_query_string(&self) -> bool {
        self.include_query_string
    }

    pub fn state(&self) -> RuleState {
        self.state
    }

    pub fn is_ignored(&self) -> bool {
        self.state == RuleState::Ignored
    }
}
