//! Shared registry of service health records with change notification.
//!
//! # Responsibilities
//! - Own one `ServiceHealth` record per service id, created lazily
//! - Apply success/failure reports atomically per id
//! - Notify subscribers synchronously after every report or reset
//!
//! # Design Decisions
//! - Constructed explicitly and shared by cloning (no process-wide static)
//! - Records live in a `DashMap`; ids never contend with each other
//! - Listeners run after the map guard is released, so they may query the registry
//! - A panicking listener is logged and skipped; the rest still run

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use dashmap::DashMap;

use crate::config::HealthConfig;
use crate::health::state::{HealthStatus, ServiceHealth};
use crate::observability::metrics;

/// Callback invoked with the service id and its post-update snapshot.
pub type HealthListener = Arc<dyn Fn(&str, &ServiceHealth) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, HealthListener)>>,
}

impl Listeners {
    fn snapshot(&self) -> Vec<HealthListener> {
        match self.entries.lock() {
            Ok(entries) => entries.iter().map(|(_, l)| l.clone()).collect(),
            Err(poisoned) => poisoned.get_ref().iter().map(|(_, l)| l.clone()).collect(),
        }
    }

    fn remove(&self, id: u64) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.retain(|(entry_id, _)| *entry_id != id);
    }
}

/// Process-wide health bookkeeping for upstream dependencies.
#[derive(Clone)]
pub struct HealthRegistry {
    records: Arc<DashMap<String, ServiceHealth>>,
    listeners: Arc<Listeners>,
    thresholds: HealthConfig,
}

impl HealthRegistry {
    pub fn new(thresholds: HealthConfig) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            listeners: Arc::new(Listeners::default()),
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &HealthConfig {
        &self.thresholds
    }

    /// Record a successful top-level call for `service`.
    pub fn report_success(&self, service: &str) -> ServiceHealth {
        let (before, after) = self.update(service, |record| record.record_success());
        self.after_update(service, before, &after);
        after
    }

    /// Record a failed top-level call for `service`.
    pub fn report_failure(&self, service: &str) -> ServiceHealth {
        let thresholds = self.thresholds;
        let (before, after) = self.update(service, |record| record.record_failure(&thresholds));
        self.after_update(service, before, &after);
        after
    }

    /// Current snapshot, creating a default record for unseen ids.
    pub fn get_health(&self, service: &str) -> ServiceHealth {
        if let Some(record) = self.records.get(service) {
            return record.clone();
        }
        self.records
            .entry(service.to_string())
            .or_default()
            .clone()
    }

    /// Force `service` back to its initial state.
    pub fn reset(&self, service: &str) -> ServiceHealth {
        let (before, after) = self.update(service, |record| *record = ServiceHealth::new());
        tracing::info!(service = %service, previous = %before, "Service health reset");
        metrics::record_service_health(service, after.status);
        self.notify(service, &after);
        after
    }

    /// Every known record, sorted by id.
    pub fn snapshot_all(&self) -> Vec<(String, ServiceHealth)> {
        let mut all: Vec<_> = self
            .records
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Register a listener for changes to any service.
    ///
    /// The listener stays registered until the returned handle is dropped
    /// or explicitly unsubscribed.
    #[must_use = "dropping the subscription unregisters the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&str, &ServiceHealth) + Send + Sync + 'static,
    {
        let id = self.listeners.next_id.fetch_add(1, Ordering::Relaxed);
        let listener: HealthListener = Arc::new(listener);
        match self.listeners.entries.lock() {
            Ok(mut entries) => entries.push((id, listener)),
            Err(poisoned) => poisoned.into_inner().push((id, listener)),
        }
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.snapshot().len()
    }

    fn update<F>(&self, service: &str, apply: F) -> (HealthStatus, ServiceHealth)
    where
        F: FnOnce(&mut ServiceHealth),
    {
        let mut record = self.records.entry(service.to_string()).or_default();
        let before = record.status;
        apply(record.value_mut());
        (before, record.clone())
    }

    fn after_update(&self, service: &str, before: HealthStatus, after: &ServiceHealth) {
        if before != after.status {
            match after.status {
                HealthStatus::Operational => tracing::info!(
                    service = %service,
                    from = %before,
                    recovery_attempts = after.recovery_attempts,
                    "Service recovered"
                ),
                _ => tracing::warn!(
                    service = %service,
                    from = %before,
                    to = %after.status,
                    consecutive_failures = after.consecutive_failures,
                    "Service health changed"
                ),
            }
        }
        metrics::record_service_health(service, after.status);
        self.notify(service, after);
    }

    fn notify(&self, service: &str, snapshot: &ServiceHealth) {
        for listener in self.listeners.snapshot() {
            let outcome = catch_unwind(AssertUnwindSafe(|| listener(service, snapshot)));
            if outcome.is_err() {
                tracing::error!(service = %service, "Health listener panicked");
            }
        }
    }
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new(HealthConfig::default())
    }
}

/// Handle that keeps a listener registered.
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_lazy_default_record() {
        let registry = HealthRegistry::default();
        let health = registry.get_health("inventory-ai");
        assert_eq!(health.status, HealthStatus::Operational);
        assert_eq!(health.consecutive_failures, 0);
        assert_eq!(health.failure_count, 0);
        assert_eq!(registry.snapshot_all().len(), 1);
    }

    #[test]
    fn test_get_health_does_not_mutate() {
        let registry = HealthRegistry::default();
        registry.report_failure("svc");
        let first = registry.get_health("svc");
        let second = registry.get_health("svc");
        assert_eq!(first, second);
    }

    #[test]
    fn test_failures_escalate_status() {
        let registry = HealthRegistry::default();
        let statuses: Vec<_> = (0..6).map(|_| registry.report_failure("svc").status).collect();
        assert_eq!(
            statuses,
            vec![
                HealthStatus::Operational,
                HealthStatus::Degraded,
                HealthStatus::Degraded,
                HealthStatus::Degraded,
                HealthStatus::Unavailable,
                HealthStatus::Unavailable,
            ]
        );
    }

    #[test]
    fn test_success_resets_from_unavailable() {
        let registry = HealthRegistry::default();
        for _ in 0..7 {
            registry.report_failure("svc");
        }
        let health = registry.report_success("svc");
        assert_eq!(health.status, HealthStatus::Operational);
        assert_eq!(health.consecutive_failures, 0);
        assert_eq!(health.failure_count, 7);
        assert_eq!(health.recovery_attempts, 1);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let registry = HealthRegistry::default();
        for _ in 0..5 {
            registry.report_failure("svc");
        }
        assert_eq!(registry.get_health("svc").status, HealthStatus::Unavailable);

        registry.reset("svc");
        let health = registry.get_health("svc");
        assert_eq!(health.status, HealthStatus::Operational);
        assert_eq!(health.consecutive_failures, 0);
        assert_eq!(health.failure_count, 0);
        assert_eq!(health.recovery_attempts, 0);
    }

    #[test]
    fn test_services_are_independent() {
        let registry = HealthRegistry::default();
        for _ in 0..5 {
            registry.report_failure("a");
        }
        registry.report_success("b");
        assert_eq!(registry.get_health("a").status, HealthStatus::Unavailable);
        assert_eq!(registry.get_health("b").status, HealthStatus::Operational);
    }

    #[test]
    fn test_listener_fires_once_per_change_with_snapshot() {
        let registry = HealthRegistry::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _sub = registry.subscribe(move |id, health| {
            seen_clone
                .lock()
                .unwrap()
                .push((id.to_string(), health.consecutive_failures, health.status));
        });

        registry.report_failure("svc");
        registry.report_failure("svc");
        registry.report_success("other");
        registry.reset("svc");

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("svc".to_string(), 1, HealthStatus::Operational),
                ("svc".to_string(), 2, HealthStatus::Degraded),
                ("other".to_string(), 0, HealthStatus::Operational),
                ("svc".to_string(), 0, HealthStatus::Operational),
            ]
        );
    }

    #[test]
    fn test_unsubscribed_listener_is_silent() {
        let registry = HealthRegistry::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let sub = registry.subscribe(move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        registry.report_failure("svc");
        sub.unsubscribe();
        registry.report_failure("svc");
        registry.reset("svc");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.listener_count(), 0);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let registry = HealthRegistry::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let _bad = registry.subscribe(|_, _| panic!("listener bug"));
        let c = calls.clone();
        let _good = registry.subscribe(move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let health = registry.report_failure("svc");
        assert_eq!(health.consecutive_failures, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_can_query_registry() {
        let registry = HealthRegistry::default();
        let inner = registry.clone();
        let observed = Arc::new(Mutex::new(None));
        let o = observed.clone();
        let _sub = registry.subscribe(move |id, _| {
            *o.lock().unwrap() = Some(inner.get_health(id).consecutive_failures);
        });

        registry.report_failure("svc");
        assert_eq!(*observed.lock().unwrap(), Some(1));
    }

    #[test]
    fn test_concurrent_reports_are_not_lost() {
        let registry = HealthRegistry::default();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let r = registry.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        r.report_failure("svc");
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(registry.get_health("svc").failure_count, 800);
    }
}
