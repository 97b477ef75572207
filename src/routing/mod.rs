//! Redirect resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Not-found request URL
//!     → request.rs (parse into absolute or rooted-relative form)
//!     → candidates.rs (ordered, de-duplicated lookup strings)
//!     → resolver.rs (exact lookup over all candidates, then prefix scan)
//!     → rewriter.rs (tail append, query merge)
//!     → Return: ResolvedRedirect or no redirect
//! ```
//!
//! # Design Decisions
//! - An exact hit on any candidate beats a prefix hit on any candidate
//! - Within a pass, the first candidate that yields a rule wins
//! - A matched ignored rule ends resolution with no redirect
//! - Stored rules are never modified; every hit derives a fresh value

pub mod candidates;
pub mod request;
pub mod resolver;
pub mod rewriter;

pub use request::RequestUrl;
pub use resolver::{MatchResolver, ResolvedRedirect};
pub use rewriter::{is_absolute_url, UrlKind, UrlRewriter};
