//! Property tests for the health state machine.

use proptest::prelude::*;

use inventory_assistant::config::HealthConfig;
use inventory_assistant::health::{HealthRegistry, HealthStatus};

proptest! {
    #[test]
    fn status_follows_consecutive_failures(reports in prop::collection::vec(any::<bool>(), 0..64)) {
        let registry = HealthRegistry::new(HealthConfig::default());
        let mut streak = 0u32;
        let mut failures = 0u64;

        for success in reports {
            let health = if success {
                streak = 0;
                registry.report_success("svc")
            } else {
                streak += 1;
                failures += 1;
                registry.report_failure("svc")
            };

            let expected = match streak {
                0..=1 => HealthStatus::Operational,
                2..=4 => HealthStatus::Degraded,
                _ => HealthStatus::Unavailable,
            };
            prop_assert_eq!(health.status, expected);
            prop_assert_eq!(health.consecutive_failures, streak);
            prop_assert_eq!(health.failure_count, failures);
        }
    }

    #[test]
    fn reset_always_restores_operational(failures in 0usize..20) {
        let registry = HealthRegistry::default();
        for _ in 0..failures {
            registry.report_failure("svc");
        }
        let health = registry.reset("svc");
        prop_assert_eq!(health.status, HealthStatus::Operational);
        prop_assert_eq!(health.consecutive_failures, 0);
        prop_assert_eq!(registry.get_health("svc"), health);
    }

    #[test]
    fn reads_never_mutate(failures in 0usize..10) {
        let registry = HealthRegistry::default();
        for _ in 0..failures {
            registry.report_failure("svc");
        }
        let first = registry.get_health("svc");
        prop_assert_eq!(registry.get_health("svc"), first);
    }
}
