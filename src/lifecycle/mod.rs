//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build registry, simulator, backend → Orchestrator
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast → Admin API drains → Orchestrator disposed
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then health, then chat
//! - Disposal runs after the admin API stops, so no request sees a half-torn state

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
pub use startup::{assemble, Assistant, StartupError};
