//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject rules that could never produce a usable redirect
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RedirectConfig → Result<(), Vec<ValidationError>>
//! - Duplicate old URLs are not errors; the index keeps the first and warns

use thiserror::Error;

use crate::config::schema::RedirectConfig;
use crate::rules::RuleState;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("rule #{index}: old_url is empty")]
    EmptyOldUrl { index: usize },

    #[error("rule #{index} ({old_url}): new_url is empty")]
    EmptyNewUrl { index: usize, old_url: String },

    #[error("unknown log level `{0}`")]
    LogLevel(String),
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a parsed configuration.
pub fn validate_config(config: &RedirectConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    for (index, rule) in config.rules.iter().enumerate() {
        if rule.state == RuleState::Deleted {
            continue;
        }
        if rule.old_url.trim().is_empty() {
            errors.push(ValidationError::EmptyOldUrl { index });
        }
        // Ignored rules only suppress, they never redirect anywhere.
        if rule.state != RuleState::Ignored && rule.new_url.trim().is_empty() {
            errors.push(ValidationError::EmptyNewUrl {
                index,
                old_url: rule.old_url.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
