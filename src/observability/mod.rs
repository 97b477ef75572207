//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! rules/index.rs   → warn on duplicate old URLs
//! routing/         → debug per resolution
//! lifecycle/       → info on publish / reload
//!     → logging.rs (tracing subscriber, text or JSON)
//! ```
//!
//! # Design Decisions
//! - Structured fields (old_url, new_url, rules) rather than formatted strings
//! - RUST_LOG overrides the configured level

pub mod logging;

pub use logging::init_logging;
