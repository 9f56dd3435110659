//! Service health subsystem.
//!
//! # Data Flow
//! ```text
//! Top-level call outcome (after retries):
//!     → registry.rs report_success / report_failure
//!     → state.rs recomputes status from consecutive failures
//!     → subscribers notified synchronously with the new snapshot
//! ```
//!
//! # Design Decisions
//! - Pure bookkeeping: no I/O, no timers, no background probing
//! - One report per top-level call, never per retry attempt
//! - Health state is per service id

pub mod registry;
pub mod state;

pub use registry::{HealthListener, HealthRegistry, Subscription};
pub use state::{HealthStatus, ServiceHealth};
