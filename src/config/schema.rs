//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::rules::{RedirectIndex, RedirectRule, RuleState};
use crate::standardizer::StandardizerKind;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RedirectConfig {
    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Lookup behaviour.
    pub resolver: ResolverConfig,

    /// Redirect rules, in priority order for prefix matching.
    pub rules: Vec<RuleConfig>,
}

impl RedirectConfig {
    /// Build a fresh index from the configured rules.
    ///
    /// Deleted rules are skipped.
    pub fn build_index(&self) -> RedirectIndex {
        let rules = self
            .rules
            .iter()
            .filter(|r| r.state != RuleState::Deleted)
            .map(RedirectRule::from);
        RedirectIndex::from_rules(self.resolver.standardizer.build(), rules)
    }

    /// Same as [`build_index`](Self::build_index), wrapped for publishing.
    pub fn build_shared_index(&self) -> Arc<RedirectIndex> {
        Arc::new(self.build_index())
    }
}

/// Resolver configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ResolverConfig {
    /// Key standardization strategy.
    pub standardizer: StandardizerKind,
}

/// One redirect rule as stored in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    /// URL or path to match.
    pub old_url: String,

    /// Redirect target.
    #[serde(default)]
    pub new_url: String,

    #[serde(default)]
    pub exact_match: bool,

    #[serde(default)]
    pub append_match_to_new_url: bool,

    #[serde(default)]
    pub include_query_string: bool,

    #[serde(default)]
    pub state: RuleState,
}

impl From<&RuleConfig> for RedirectRule {
    fn from(config: &RuleConfig) -> Self {
        RedirectRule::new(config.old_url.clone(), config.new_url.clone())
            .with_exact_match(config.exact_match)
            .with_append_match(config.append_match_to_new_url)
            .with_include_query_string(config.include_query_string)
            .with_state(config.state)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
