//! Chat orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! submit(text)
//!     → orchestrator.rs (guard: non-empty, not in flight, not disposed)
//!     → simulation mode?  simulator
//!       otherwise         backend.rs under retries + per-attempt timeout
//!                         → health registry (one report per call)
//!                         → failure + fallback enabled? simulator
//!     → pacing.rs (thinking → typing → answer → follow-ups)
//!     → ChatView over watch, Notice over broadcast
//! ```
//!
//! # Design Decisions
//! - The orchestrator owns no UI; consumers render `ChatView` snapshots
//! - The endpoint sits behind the `ChatBackend` trait so tests can script it
//! - Unavailable health flips the orchestrator into simulation mode once;
//!   flipping back is a manual toggle

pub mod backend;
pub mod orchestrator;
pub mod pacing;
pub mod types;

pub use backend::{ChatBackend, ChatRequest, HttpChatBackend, WireMessage};
pub use orchestrator::{ChatOrchestrator, ChatSettings};
pub use pacing::{DisposalSet, Disposed};
pub use types::{
    AnswerSource, ChatError, ChatPhase, ChatView, Message, Notice, NoticeVariant, RejectReason,
    Role, SubmitOutcome, FOLLOW_UP_PROMPTS,
};
