use std::sync::Arc;
use std::time::Duration;

use pawguard_application::CounterStore;

use super::*;

pub(super) async fn check_counter_store(
    counter_store: Option<Arc<dyn CounterStore>>,
    timeout: Duration,
) -> HealthDependencyStatus {
    let Some(counter_store) = counter_store else {
        return HealthDependencyStatus {
            status: "disabled",
            detail: None,
        };
    };

    match tokio::time::timeout(timeout, counter_store.ping()).await {
        Ok(Ok(())) => HealthDependencyStatus {
            status: "ok",
            detail: None,
        },
        Ok(Err(error)) => HealthDependencyStatus {
            status: "error",
            detail: Some(format!("counter store ping failed: {error}")),
        },
        Err(_) => HealthDependencyStatus {
            status: "error",
            detail: Some(format!(
                "counter store ping timed out after {} ms",
                timeout.as_millis()
            )),
        },
    }
}

pub(super) fn check_identity_provider(configured: bool) -> HealthDependencyStatus {
    HealthDependencyStatus {
        status: if configured { "ok" } else { "disabled" },
        detail: None,
    }
}
