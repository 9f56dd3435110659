//! Chat types and error definitions.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resilience::AttemptTimeout;
use crate::simulator::SimulationError;

/// Prompts offered after an answer has been shown.
pub const FOLLOW_UP_PROMPTS: &[&str] = &[
    "What products are running low on stock?",
    "What should I restock this week?",
    "How can I optimize inventory turnover?",
    "Analyze sales trends by category",
    "Predict demand for the next 30 days",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub created_at: SystemTime,
}

impl Message {
    pub fn new(id: u64, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            created_at: SystemTime::now(),
        }
    }
}

/// Where the UI is in the answer pacing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatPhase {
    #[default]
    Idle,
    Thinking,
    Typing,
}

/// Everything a chat UI renders.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ChatView {
    pub transcript: Vec<Message>,
    pub input: String,
    pub phase: ChatPhase,
    /// Set when a submission could not be answered; cleared on the next one.
    pub error: Option<String>,
    pub simulation_mode: bool,
    /// Retries spent on the current submission.
    pub retry_count: u32,
    pub last_query: Option<String>,
    pub follow_ups_visible: bool,
    /// Suggested next questions; empty until `follow_ups_visible` turns on.
    pub follow_ups: Vec<String>,
}

impl ChatView {
    pub fn is_busy(&self) -> bool {
        self.phase != ChatPhase::Idle
    }

    pub(crate) fn show_follow_ups(&mut self) {
        self.follow_ups_visible = true;
        self.follow_ups = FOLLOW_UP_PROMPTS.iter().map(|p| p.to_string()).collect();
    }

    pub(crate) fn hide_follow_ups(&mut self) {
        self.follow_ups_visible = false;
        self.follow_ups.clear();
    }

    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.transcript.iter().rev().find(|m| m.role == Role::Assistant)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Info,
    Success,
    Destructive,
}

/// User-visible toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub variant: NoticeVariant,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn new(variant: NoticeVariant, title: &str, description: impl Into<String>) -> Self {
        Self {
            variant,
            title: title.to_string(),
            description: description.into(),
        }
    }
}

/// Who produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    Endpoint,
    Simulator,
    /// Simulator answer after the endpoint exhausted its retries.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    EmptyInput,
    InFlight,
    NothingToRetry,
}

/// Result of a submission. Submissions never return an error directly.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Answered(AnswerSource),
    /// No answer could be produced; the view carries the error state.
    Failed(ChatError),
    Rejected(RejectReason),
    /// The orchestrator was disposed before the answer was shown.
    Disposed,
}

impl SubmitOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SubmitOutcome::Answered(AnswerSource::Endpoint) => "answered",
            SubmitOutcome::Answered(AnswerSource::Simulator) => "simulated",
            SubmitOutcome::Answered(AnswerSource::Fallback) => "fallback",
            SubmitOutcome::Failed(_) => "failed",
            SubmitOutcome::Rejected(_) => "rejected",
            SubmitOutcome::Disposed => "disposed",
        }
    }
}

/// Errors from producing an assistant answer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChatError {
    /// Endpoint answered with a non-success status.
    #[error("AI service returned HTTP {status}")]
    Status { status: u16 },

    #[error("AI service unreachable: {0}")]
    Transport(String),

    #[error(transparent)]
    Timeout(#[from] AttemptTimeout),

    #[error("AI service sent an unreadable response: {0}")]
    Decode(String),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

impl ChatError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ChatError::Status { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Status { status } => *status >= 500 || *status == 429 || *status == 408,
            ChatError::Transport(_) | ChatError::Timeout(_) => true,
            ChatError::Decode(_) => false,
            ChatError::Simulation(e) => e.is_retryable(),
        }
    }
}
