//! Simulator types and error definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SimulatorConfig;
use crate::simulator::templates::TemplateError;

/// What the user is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    LowStock,
    Restock,
    Optimize,
    Analyze,
    Predict,
    General,
}

impl Intent {
    pub const ALL: [Intent; 6] = [
        Intent::LowStock,
        Intent::Restock,
        Intent::Optimize,
        Intent::Analyze,
        Intent::Predict,
        Intent::General,
    ];

    /// Keyword classification; first matching intent wins.
    pub fn classify(query: &str) -> Self {
        let q = query.to_lowercase();
        let any = |words: &[&str]| words.iter().any(|w| q.contains(w));

        if any(&["low stock", "running low", "low on stock", "low inventory", "out of stock"])
            || (q.contains("low") && q.contains("stock"))
        {
            Intent::LowStock
        } else if any(&["restock", "reorder", "replenish", "order more", "purchase order"]) {
            Intent::Restock
        } else if any(&["optimiz", "optimis", "turnover", "slow mov", "fast mov"]) {
            Intent::Optimize
        } else if any(&["analy", "trend", "performance", "best sell", "top sell"]) {
            Intent::Analyze
        } else if any(&["predict", "forecast", "demand", "next month", "projection"]) {
            Intent::Predict
        } else {
            Intent::General
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::LowStock => "low_stock",
            Intent::Restock => "restock",
            Intent::Optimize => "optimize",
            Intent::Analyze => "analyze",
            Intent::Predict => "predict",
            Intent::General => "general",
        }
    }
}

/// Latency and failure behaviour of the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOptions {
    /// Nominal latency before an answer is produced.
    pub delay: Duration,
    /// Probability of an injected failure, clamped to 0.0..=1.0.
    pub error_probability: f64,
    /// Relative latency jitter; 0.3 scales the delay by a factor in 0.7..=1.3.
    pub variability: f64,
}

impl SimulationOptions {
    /// Instant, never-failing options.
    pub fn reliable() -> Self {
        Self {
            delay: Duration::ZERO,
            error_probability: 0.0,
            variability: 0.0,
        }
    }
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self::from(&SimulatorConfig::default())
    }
}

impl From<&SimulatorConfig> for SimulationOptions {
    fn from(config: &SimulatorConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.delay_ms),
            error_probability: config.error_probability,
            variability: config.variability,
        }
    }
}

/// Coarse category of a simulator failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationErrorKind {
    Injected,
    Template,
}

/// Errors produced by the response simulator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// Deliberately injected failure standing in for a flaky backend.
    #[error("AI service temporarily unavailable (simulated)")]
    Injected,

    /// Broken template data.
    #[error("response template error: {0}")]
    Template(#[from] TemplateError),
}

impl SimulationError {
    pub fn kind(&self) -> SimulationErrorKind {
        match self {
            SimulationError::Injected => SimulationErrorKind::Injected,
            SimulationError::Template(_) => SimulationErrorKind::Template,
        }
    }

    /// Injected failures are transient by contract; template bugs are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SimulationError::Injected)
    }
}
