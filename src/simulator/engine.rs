//! Templated stand-in for the AI backend.
//!
//! # Responsibilities
//! - Wait a configurable, optionally jittered latency
//! - Inject retryable failures at a configured probability
//! - Classify the query, pick a template uniformly, fill its placeholders
//!
//! # Design Decisions
//! - Options live behind `ArcSwap` so config reloads apply without a rebuild
//! - The RNG lock is never held across an await

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use arc_swap::ArcSwap;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::SimulatorConfig;
use crate::observability::metrics;
use crate::simulator::inventory::Inventory;
use crate::simulator::templates::{render, templates_for, TemplateError};
use crate::simulator::types::{Intent, SimulationError, SimulationOptions};

/// Forecast horizon used by demand answers.
const FORECAST_HORIZON_DAYS: u32 = 30;

pub struct ResponseSimulator {
    options: ArcSwap<SimulationOptions>,
    inventory: Inventory,
    rng: Mutex<StdRng>,
}

impl ResponseSimulator {
    pub fn new(options: SimulationOptions, inventory: Inventory) -> Self {
        Self::with_rng(options, inventory, StdRng::from_entropy())
    }

    /// Reproducible simulator for tests and demos.
    pub fn with_seed(options: SimulationOptions, inventory: Inventory, seed: u64) -> Self {
        Self::with_rng(options, inventory, StdRng::seed_from_u64(seed))
    }

    pub fn from_config(config: &SimulatorConfig, inventory: Inventory) -> Self {
        let options = SimulationOptions::from(config);
        match config.seed {
            Some(seed) => Self::with_seed(options, inventory, seed),
            None => Self::new(options, inventory),
        }
    }

    fn with_rng(options: SimulationOptions, inventory: Inventory, rng: StdRng) -> Self {
        Self {
            options: ArcSwap::from_pointee(options),
            inventory,
            rng: Mutex::new(rng),
        }
    }

    pub fn options(&self) -> Arc<SimulationOptions> {
        self.options.load_full()
    }

    pub fn update_options(&self, options: SimulationOptions) {
        tracing::info!(
            delay_ms = options.delay.as_millis() as u64,
            error_probability = options.error_probability,
            variability = options.variability,
            "Simulator options updated"
        );
        self.options.store(Arc::new(options));
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Produce a simulated answer for `query`.
    pub async fn generate_response(&self, query: &str) -> Result<String, SimulationError> {
        let options = self.options.load_full();
        let (delay, fail) = {
            let mut rng = self.rng();
            let delay = jittered(options.delay, options.variability, &mut *rng);
            let fail = rng.gen_bool(options.error_probability.clamp(0.0, 1.0));
            (delay, fail)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if fail {
            tracing::debug!(query_len = query.len(), "Injecting simulated failure");
            return Err(SimulationError::Injected);
        }

        let (intent, text) = self.compose(query).inspect_err(|e| {
            tracing::error!(error = %e, "Simulator template data is malformed");
        })?;
        metrics::record_simulated_response(intent.as_str());
        Ok(text)
    }

    /// Classify and render without latency or failure injection.
    pub fn compose(&self, query: &str) -> Result<(Intent, String), SimulationError> {
        let intent = Intent::classify(query);
        let family = templates_for(intent);
        let template = {
            let mut rng = self.rng();
            *family
                .choose(&mut *rng)
                .ok_or(TemplateError::EmptyFamily(intent.as_str()))?
        };
        let text = render(template, &self.placeholders(intent))?;
        Ok((intent, text))
    }

    fn placeholders(&self, intent: Intent) -> HashMap<&'static str, String> {
        let inv = &self.inventory;
        let mut values = HashMap::new();
        match intent {
            Intent::LowStock => {
                values.insert("low_stock_items", inv.low_stock_report());
                values.insert("low_stock_count", inv.low_stock().len().to_string());
            }
            Intent::Restock => {
                let (plan, total) = inv.restock_plan();
                values.insert("restock_plan", plan);
                values.insert("restock_total", format!("${:.2}", total));
            }
            Intent::Optimize => {
                values.insert("turnover_report", inv.turnover_report());
            }
            Intent::Analyze => {
                let (report, top) = inv.trend_report();
                values.insert("trend_report", report);
                values.insert("top_category", top);
            }
            Intent::Predict => {
                values.insert("demand_forecast", inv.demand_forecast(FORECAST_HORIZON_DAYS));
                values.insert("horizon_days", FORECAST_HORIZON_DAYS.to_string());
            }
            Intent::General => {
                values.insert("inventory_summary", inv.summary());
            }
        }
        values
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn jittered(base: Duration, variability: f64, rng: &mut impl Rng) -> Duration {
    if base.is_zero() || variability <= 0.0 {
        return base;
    }
    let v = variability.min(1.0);
    base.mul_f64(rng.gen_range((1.0 - v)..=(1.0 + v)))
}
