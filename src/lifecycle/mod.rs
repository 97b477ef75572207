//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Build index → Publish (reload.rs)
//!
//! Reload (reload.rs):
//!     Watcher update → Build new index off to the side → Atomic swap
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C / EOF → Broadcast → Update loop exits
//! ```
//!
//! # Design Decisions
//! - Readers always see a complete old or complete new index
//! - A failed reload leaves the published index in place

pub mod reload;
pub mod shutdown;

pub use reload::RedirectTable;
pub use shutdown::Shutdown;
