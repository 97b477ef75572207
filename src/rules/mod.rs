//! Redirect rule storage.
//!
//! # Data Flow
//! ```text
//! Rule source (config file, reload)
//!     → rule.rs (RedirectRule, immutable once built)
//!     → index.rs (standardized key → rule, plus ordered sequence)
//!     → published as a whole via lifecycle::RedirectTable
//! ```
//!
//! # Design Decisions
//! - Keys are standardized, then compared case-insensitively
//! - First registration of a key wins; later ones log a warning
//! - Index is built off to the side and never mutated once published

pub mod index;
pub mod rule;

pub use index::RedirectIndex;
pub use rule::{RedirectRule, RuleState};
