//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and cross-field
//! constraints. All violations are collected, not just the first.

use std::fmt;

use crate::config::schema::AssistantConfig;

/// A single semantic violation, keyed by its dotted field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AssistantConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if url::Url::parse(&config.endpoint.url).is_err() {
        errors.push(ValidationError::new(
            "endpoint.url",
            format!("'{}' is not a valid URL", config.endpoint.url),
        ));
    }
    if config.endpoint.service_id.trim().is_empty() {
        errors.push(ValidationError::new("endpoint.service_id", "must not be empty"));
    }

    if config.retry.base_delay_ms == 0 {
        errors.push(ValidationError::new("retry.base_delay_ms", "must be > 0"));
    }
    if config.retry.max_delay_ms < config.retry.base_delay_ms {
        errors.push(ValidationError::new(
            "retry.max_delay_ms",
            "must be >= retry.base_delay_ms",
        ));
    }

    let health = &config.health;
    if health.degraded_after == 0 {
        errors.push(ValidationError::new("health.degraded_after", "must be >= 1"));
    }
    if health.unavailable_after <= health.degraded_after {
        errors.push(ValidationError::new(
            "health.unavailable_after",
            "must be greater than health.degraded_after",
        ));
    }

    let p = config.simulator.error_probability;
    if !(0.0..=1.0).contains(&p) {
        errors.push(ValidationError::new(
            "simulator.error_probability",
            format!("{} is outside 0.0..=1.0", p),
        ));
    }
    let v = config.simulator.variability;
    if !(0.0..1.0).contains(&v) {
        errors.push(ValidationError::new(
            "simulator.variability",
            format!("{} is outside 0.0..1.0", v),
        ));
    }

    if config.chat.typing_max_ms < config.chat.typing_base_ms {
        errors.push(ValidationError::new(
            "chat.typing_max_ms",
            "must be >= chat.typing_base_ms",
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address",
        ));
    }
    if config.admin.enabled
        && config
            .admin
            .bind_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "admin.bind_address",
            "must be a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AssistantConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AssistantConfig::default();
        config.endpoint.url = "not a url".into();
        config.health.degraded_after = 5;
        config.health.unavailable_after = 5;
        config.simulator.error_probability = 1.5;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "endpoint.url",
                "health.unavailable_after",
                "simulator.error_probability"
            ]
        );
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::new("retry.base_delay_ms", "must be > 0");
        assert_eq!(err.to_string(), "retry.base_delay_ms: must be > 0");
    }
}
