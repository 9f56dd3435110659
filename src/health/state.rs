//! Service health state machine.
//!
//! # States
//! - Operational: dependency answers normally
//! - Degraded: a few consecutive failures, still worth calling
//! - Unavailable: callers should stop relying on it
//!
//! # State Transitions
//! ```text
//! status = classify(consecutive_failures)
//!     < degraded_after                  → Operational
//!     degraded_after..unavailable_after → Degraded
//!     >= unavailable_after              → Unavailable
//! ```
//!
//! There is no time-based recovery. A single success returns the service to
//! Operational.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::config::HealthConfig;

/// Coarse health classification of a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Operational,
    Degraded,
    Unavailable,
}

impl HealthStatus {
    /// Pure mapping from consecutive failures to a status.
    pub fn classify(consecutive_failures: u32, thresholds: &HealthConfig) -> Self {
        if consecutive_failures >= thresholds.unavailable_after {
            HealthStatus::Unavailable
        } else if consecutive_failures >= thresholds.degraded_after {
            HealthStatus::Degraded
        } else {
            HealthStatus::Operational
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Operational => "operational",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health record of a single dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    /// Time of the most recent report (creation time before any report).
    pub last_checked: SystemTime,
    /// Lifetime failure count.
    pub failure_count: u64,
    /// Failures since the last success.
    pub consecutive_failures: u32,
    /// Successes recorded while recovering from a non-operational status.
    pub recovery_attempts: u32,
}

impl ServiceHealth {
    pub fn new() -> Self {
        Self {
            status: HealthStatus::Operational,
            last_checked: SystemTime::now(),
            failure_count: 0,
            consecutive_failures: 0,
            recovery_attempts: 0,
        }
    }

    pub(crate) fn record_success(&mut self) {
        if self.status != HealthStatus::Operational {
            self.recovery_attempts = self.recovery_attempts.saturating_add(1);
        }
        self.consecutive_failures = 0;
        self.status = HealthStatus::Operational;
        self.last_checked = SystemTime::now();
    }

    pub(crate) fn record_failure(&mut self, thresholds: &HealthConfig) {
        self.failure_count = self.failure_count.saturating_add(1);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.recovery_attempts = 0;
        self.status = HealthStatus::classify(self.consecutive_failures, thresholds);
        self.last_checked = SystemTime::now();
    }
}

impl Default for ServiceHealth {
    fn default() -> Self {
        Self::new()
    }
}
