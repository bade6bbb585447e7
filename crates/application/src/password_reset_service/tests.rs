use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pawguard_core::{AppError, AppResult};
use pawguard_domain::EmailAddress;

use super::{AccountRecoveryGateway, PasswordResetService};
use crate::rate_limit_service::CounterStore;

#[derive(Default)]
struct TestCounterStore {
    counters: Mutex<HashMap<String, u64>>,
}

impl TestCounterStore {
    fn count(&self, key: &str) -> u64 {
        self.counters
            .lock()
            .map(|counters| counters.get(key).copied().unwrap_or_default())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CounterStore for TestCounterStore {
    async fn increment_with_expiry(&self, key: &str, _seconds: u64) -> AppResult<u64> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock counters: {error}")))?;
        let counter = counters.entry(key.to_owned()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn get(&self, key: &str) -> AppResult<u64> {
        Ok(self.count(key))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct TestRecoveryGateway {
    sent: Mutex<Vec<String>>,
    failure: Option<(u16, String)>,
}

impl TestRecoveryGateway {
    fn failing(status: u16, message: &str) -> Self {
        Self {
            failure: Some((status, message.to_owned())),
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AccountRecoveryGateway for TestRecoveryGateway {
    async fn send_recovery_email(&self, email: &EmailAddress) -> AppResult<()> {
        if let Some((status, message)) = &self.failure {
            return Err(AppError::Upstream {
                status: *status,
                message: message.clone(),
            });
        }

        self.sent
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock gateway: {error}")))?
            .push(email.as_str().to_owned());
        Ok(())
    }
}

#[tokio::test]
async fn fourth_request_for_same_email_is_rate_limited() {
    let store = Arc::new(TestCounterStore::default());
    let gateway = Arc::new(TestRecoveryGateway::default());
    let service = PasswordResetService::new(store.clone(), gateway.clone());

    for _ in 0..3 {
        assert!(service.request_reset("owner@grooming.example").await.is_ok());
    }

    let result = service.request_reset("owner@grooming.example").await;
    assert!(matches!(
        result,
        Err(AppError::RateLimited {
            retry_after_seconds: 3600,
            ..
        })
    ));
    assert_eq!(gateway.sent().len(), 3);
    assert_eq!(store.count("reset:owner@grooming.example"), 4);
}

#[tokio::test]
async fn mixed_case_emails_share_one_counter() {
    let store = Arc::new(TestCounterStore::default());
    let gateway = Arc::new(TestRecoveryGateway::default());
    let service = PasswordResetService::new(store.clone(), gateway.clone());

    assert!(service.request_reset("A@X.com").await.is_ok());
    assert!(service.request_reset(" a@x.com ").await.is_ok());
    assert!(service.request_reset("a@X.COM").await.is_ok());
    assert!(service.request_reset("a@x.com").await.is_err());

    assert_eq!(store.count("reset:a@x.com"), 4);
    assert_eq!(gateway.sent(), vec!["a@x.com".to_owned(); 3]);
}

#[tokio::test]
async fn invalid_email_does_not_touch_the_store() {
    let store = Arc::new(TestCounterStore::default());
    let service =
        PasswordResetService::new(store.clone(), Arc::new(TestRecoveryGateway::default()));

    let result = service.request_reset("not-an-email").await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(
        store
            .counters
            .lock()
            .map(|counters| counters.is_empty())
            .unwrap_or_default()
    );
}

#[tokio::test]
async fn upstream_errors_propagate_unchanged() {
    let service = PasswordResetService::new(
        Arc::new(TestCounterStore::default()),
        Arc::new(TestRecoveryGateway::failing(422, "email address not authorized")),
    );

    let result = service.request_reset("owner@grooming.example").await;
    assert!(matches!(
        result,
        Err(AppError::Upstream {
            status: 422,
            ref message,
        }) if message == "email address not authorized"
    ));
}
