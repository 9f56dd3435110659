//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::AssistantConfig;

/// Monitors the configuration file and forwards every valid reload.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<AssistantConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<AssistantConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    tracing::info!(path = ?path, "Config file change detected, reloading");
                    match load_config(&path) {
                        Ok(new_config) => {
                            let _ = tx.send(new_config);
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::{Inventory, ResponseSimulator, SimulationOptions};

    const INITIAL: &str = "[simulator]\nerror_probability = 0.0\n";
    const UPDATED: &str = "[simulator]\nerror_probability = 0.5\ndelay_ms = 10\n";

    #[tokio::test]
    async fn test_rewrite_delivers_reloaded_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assistant.toml");
        std::fs::write(&path, INITIAL).unwrap();

        let (watcher, mut updates) = ConfigWatcher::new(&path);
        let _guard = watcher.run().unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        std::fs::write(&path, UPDATED).unwrap();

        // A rewrite can surface as several events; wait for the finished file.
        let reloaded = tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                let config = updates.recv().await.expect("watcher channel closed");
                if config.simulator.error_probability == 0.5 {
                    return config;
                }
            }
        })
        .await
        .expect("no reload within 10s");
        assert_eq!(reloaded.simulator.delay_ms, 10);

        let simulator = ResponseSimulator::with_seed(
            SimulationOptions::reliable(),
            Inventory::sample(),
            1,
        );
        simulator.update_options(SimulationOptions::from(&reloaded.simulator));
        assert_eq!(simulator.options().error_probability, 0.5);
        assert_eq!(simulator.options().delay, Duration::from_millis(10));
    }
}
