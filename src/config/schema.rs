//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the assistant.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the inventory assistant.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AssistantConfig {
    /// Real AI endpoint settings.
    pub endpoint: EndpointConfig,

    /// Retry configuration for endpoint calls.
    pub retry: RetryConfig,

    /// Health classification thresholds.
    pub health: HealthConfig,

    /// Response simulator settings.
    pub simulator: SimulatorConfig,

    /// Chat pacing and fallback behaviour.
    pub chat: ChatConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

/// Upstream AI endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EndpointConfig {
    /// Chat completion URL (e.g., "http://127.0.0.1:3000/api/chat").
    pub url: String,

    /// Identifier the endpoint is tracked under in the health registry.
    pub service_id: String,

    /// Per-attempt request timeout in milliseconds (0 disables).
    pub request_timeout_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000/api/chat".to_string(),
            service_id: "ai-chat".to_string(),
            request_timeout_ms: 15_000,
        }
    }
}

impl EndpointConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Additional attempts after the first failure.
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Add up to 10% random jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
            jitter: false,
        }
    }
}

/// Health classification thresholds on consecutive failures.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct HealthConfig {
    /// Consecutive failures at which a service becomes degraded.
    pub degraded_after: u32,

    /// Consecutive failures at which a service becomes unavailable.
    pub unavailable_after: u32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            degraded_after: 2,
            unavailable_after: 5,
        }
    }
}

/// Response simulator configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Simulated latency in milliseconds.
    pub delay_ms: u64,

    /// Probability (0.0..=1.0) of an injected failure.
    pub error_probability: f64,

    /// Relative latency jitter (0.0 disables, 0.5 means ±50%).
    pub variability: f64,

    /// Fixed RNG seed for reproducible output.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1500,
            error_probability: 0.05,
            variability: 0.3,
            seed: None,
        }
    }
}

/// Chat orchestration configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ChatConfig {
    /// Answer through the simulator when the endpoint fails.
    pub fallback_enabled: bool,

    /// Start in simulation mode instead of calling the endpoint.
    pub start_in_simulation: bool,

    /// Minimum time spent in the thinking phase.
    pub thinking_delay_ms: u64,

    /// Fixed part of the typing interval.
    pub typing_base_ms: u64,

    /// Per-character part of the typing interval.
    pub typing_ms_per_char: u64,

    /// Upper bound on the typing interval.
    pub typing_max_ms: u64,

    /// Delay before follow-up suggestions are shown.
    pub follow_up_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            fallback_enabled: true,
            start_in_simulation: false,
            thinking_delay_ms: 600,
            typing_base_ms: 400,
            typing_ms_per_char: 5,
            typing_max_ms: 2500,
            follow_up_delay_ms: 1000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin and chat API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the HTTP API.
    pub enabled: bool,

    /// Bind address for the HTTP API.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AssistantConfig = toml::from_str("").unwrap();
        assert_eq!(config, AssistantConfig::default());
        assert_eq!(config.health.degraded_after, 2);
        assert_eq!(config.health.unavailable_after, 5);
    }

    #[test]
    fn test_partial_sections() {
        let config: AssistantConfig = toml::from_str(
            r#"
            [simulator]
            error_probability = 0.0

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.simulator.error_probability, 0.0);
        assert_eq!(config.simulator.delay_ms, 1500);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_zero_timeout_disables() {
        let mut endpoint = EndpointConfig::default();
        assert_eq!(endpoint.request_timeout(), Some(Duration::from_secs(15)));
        endpoint.request_timeout_ms = 0;
        assert_eq!(endpoint.request_timeout(), None);
    }
}
