//! Inventory Assistant
//!
//! Resilience layer between an inventory chat UI and its AI backend.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                 INVENTORY ASSISTANT                  │
//!                 │                                                      │
//!   POST /chat    │  ┌─────────┐    ┌──────────────┐    ┌────────────┐   │
//!   ──────────────┼─▶│  admin  │───▶│     chat     │───▶│ resilience │───┼──▶ AI endpoint
//!                 │  │  (axum) │    │ orchestrator │    │ retry+time │   │
//!                 │  └─────────┘    └──────┬───────┘    └─────┬──────┘   │
//!                 │                        │                  │          │
//!                 │                        ▼                  ▼          │
//!                 │                 ┌────────────┐     ┌────────────┐    │
//!                 │                 │ simulator  │     │   health   │    │
//!                 │                 │ (fallback) │◀────│  registry  │    │
//!                 │                 └────────────┘     └────────────┘    │
//!                 │                                                      │
//!                 │  config (toml + notify) · observability · lifecycle  │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use inventory_assistant::admin::{self, AppState};
use inventory_assistant::config::watcher::ConfigWatcher;
use inventory_assistant::config::{load_config, AssistantConfig};
use inventory_assistant::lifecycle::{assemble, wait_for_signal, Shutdown};
use inventory_assistant::observability::{logging, metrics};
use inventory_assistant::simulator::SimulationOptions;

#[derive(Parser)]
#[command(name = "inventory-assistant")]
#[command(about = "Resilient AI chat assistant for inventory management", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AssistantConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "inventory-assistant starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let assistant = assemble(config)?;
    let shutdown = Shutdown::new();

    // Hot reload: only simulator options apply live.
    let _watcher = match &args.config {
        Some(path) => {
            let (watcher, mut updates) = ConfigWatcher::new(path);
            let simulator = assistant.simulator.clone();
            let mut stop = shutdown.subscribe();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        Some(new_config) = updates.recv() => {
                            simulator.update_options(SimulationOptions::from(&new_config.simulator));
                        }
                        _ = stop.recv() => break,
                        else => break,
                    }
                }
            });
            match watcher.run() {
                Ok(w) => Some(w),
                Err(e) => {
                    tracing::error!(error = %e, "Config watcher failed to start, hot reload disabled");
                    None
                }
            }
        }
        None => None,
    };

    let admin_task = if assistant.config.admin.enabled {
        let listener = TcpListener::bind(&assistant.config.admin.bind_address).await?;
        let state = AppState::new(assistant.orchestrator.clone());
        let stop = shutdown.subscribe();
        Some(tokio::spawn(admin::serve(listener, state, stop)))
    } else {
        None
    };

    wait_for_signal().await;
    shutdown.trigger();

    if let Some(task) = admin_task {
        match task.await {
            Ok(Err(e)) => tracing::error!(error = %e, "Admin API failed"),
            Err(e) => tracing::error!(error = %e, "Admin API task panicked"),
            Ok(Ok(())) => {}
        }
    }

    assistant.orchestrator.dispose();
    tracing::info!("Shutdown complete");
    Ok(())
}
