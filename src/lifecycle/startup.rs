//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Build the health registry, simulator and endpoint client in order
//! - Wire them into one chat orchestrator
//!
//! # Design Decisions
//! - Fail fast: an invalid config or endpoint URL is fatal
//! - The backend is injectable so tests can run the full assembly offline

use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::chat::{ChatBackend, ChatOrchestrator, ChatSettings, HttpChatBackend};
use crate::config::validation::validate_config;
use crate::config::{AssistantConfig, ConfigError};
use crate::health::HealthRegistry;
use crate::simulator::{Inventory, ResponseSimulator};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid endpoint URL '{url}': {source}")]
    Endpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Every long-lived component of a running assistant.
pub struct Assistant {
    pub config: AssistantConfig,
    pub registry: HealthRegistry,
    pub simulator: Arc<ResponseSimulator>,
    pub orchestrator: Arc<ChatOrchestrator>,
}

/// Build an assistant that talks to the configured HTTP endpoint.
pub fn assemble(config: AssistantConfig) -> Result<Assistant, StartupError> {
    validate_config(&config).map_err(ConfigError::Validation)?;

    let url = Url::parse(&config.endpoint.url).map_err(|source| StartupError::Endpoint {
        url: config.endpoint.url.clone(),
        source,
    })?;
    let backend = Arc::new(HttpChatBackend::new(url));
    Ok(assemble_with_backend(config, backend))
}

/// Build an assistant around an already constructed backend.
pub fn assemble_with_backend(config: AssistantConfig, backend: Arc<dyn ChatBackend>) -> Assistant {
    let registry = HealthRegistry::new(config.health);
    let simulator = Arc::new(ResponseSimulator::from_config(
        &config.simulator,
        Inventory::sample(),
    ));
    let orchestrator = Arc::new(ChatOrchestrator::new(
        ChatSettings::from_config(&config),
        backend,
        simulator.clone(),
        registry.clone(),
    ));

    tracing::info!(
        endpoint = %config.endpoint.url,
        service = %config.endpoint.service_id,
        max_retries = config.retry.max_retries,
        fallback = config.chat.fallback_enabled,
        simulation = config.chat.start_in_simulation,
        "Assistant assembled"
    );

    Assistant {
        config,
        registry,
        simulator,
        orchestrator,
    }
}
