//! Response simulator subsystem.
//!
//! # Data Flow
//! ```text
//! query
//!     → types.rs Intent::classify (keyword matching)
//!     → templates.rs (uniform pick within the intent's family)
//!     → inventory.rs (compute the intent's report blocks)
//!     → templates.rs render (fill placeholders)
//!     → answer text
//! ```
//!
//! # Design Decisions
//! - Latency is simulated so UI pacing looks the same as with the real backend
//! - Injected failures are retryable; template errors are bugs and are not

pub mod engine;
pub mod inventory;
pub mod templates;
pub mod types;

pub use engine::ResponseSimulator;
pub use inventory::{Inventory, InventoryItem};
pub use templates::TemplateError;
pub use types::{Intent, SimulationError, SimulationErrorKind, SimulationOptions};
