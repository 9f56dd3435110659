//! Inventory Assistant Resilience Library

pub mod admin;
pub mod chat;
pub mod config;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod simulator;

pub use chat::ChatOrchestrator;
pub use config::schema::AssistantConfig;
pub use health::HealthRegistry;
pub use lifecycle::Shutdown;
pub use simulator::ResponseSimulator;
