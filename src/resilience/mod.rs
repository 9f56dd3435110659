//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the AI endpoint:
//!     → timeouts.rs (per-attempt deadline)
//!     → On failure: retries.rs (retry with backoff.rs delays)
//!     → Overall outcome reported to the health registry by the caller
//! ```
//!
//! # Design Decisions
//! - Errors are returned unchanged so callers can inspect status and retryability
//! - Backoff is bounded; the cap keeps worst-case waits predictable

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{retry, retry_with_backoff, RetryPolicy};
pub use timeouts::{with_timeout, AttemptTimeout};
