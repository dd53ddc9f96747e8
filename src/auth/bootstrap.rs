//! Lazy, once-per-process creation of the single principal row.
//!
//! Concurrent callers share one in-flight attempt. A successful attempt flips
//! `ready` and every later call returns without touching storage. A failed
//! attempt is reported to everyone who joined it and then forgotten, so the
//! next request starts a fresh one.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::TenantConfig;
use crate::database::models::NewPrincipal;
use crate::database::PrincipalStore;

#[derive(Debug, Clone, Error)]
#[error("failed to ensure principal {id}: {reason}")]
pub struct BootstrapError {
    pub id: i64,
    pub reason: String,
}

type Attempt = Shared<BoxFuture<'static, Result<(), BootstrapError>>>;

pub struct PrincipalBootstrap {
    store: Arc<dyn PrincipalStore>,
    tenant: TenantConfig,
    ready: AtomicBool,
    in_flight: Mutex<Option<Attempt>>,
}

impl PrincipalBootstrap {
    pub fn new(store: Arc<dyn PrincipalStore>, tenant: TenantConfig) -> Self {
        Self {
            store,
            tenant,
            ready: AtomicBool::new(false),
            in_flight: Mutex::new(None),
        }
    }

    pub fn user_id(&self) -> i64 {
        self.tenant.user_id
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Make sure the configured principal exists. Idempotent and safe to call
    /// from any number of concurrent requests.
    pub async fn ensure_principal(&self) -> Result<(), BootstrapError> {
        if self.is_ready() {
            return Ok(());
        }

        let attempt = {
            let mut in_flight = self.in_flight.lock().await;
            if self.is_ready() {
                return Ok(());
            }
            match in_flight.as_ref() {
                Some(attempt) => attempt.clone(),
                None => {
                    let attempt = create_principal(self.store.clone(), self.tenant.clone())
                        .boxed()
                        .shared();
                    *in_flight = Some(attempt.clone());
                    attempt
                }
            }
        };

        // Await a clone so `attempt` keeps its identity for the ptr_eq below.
        let result = attempt.clone().await;

        let mut in_flight = self.in_flight.lock().await;
        if result.is_ok() {
            self.ready.store(true, Ordering::Release);
        }
        if in_flight.as_ref().is_some_and(|current| current.ptr_eq(&attempt)) {
            *in_flight = None;
        }

        result
    }
}

async fn create_principal(store: Arc<dyn PrincipalStore>, tenant: TenantConfig) -> Result<(), BootstrapError> {
    let id = tenant.user_id;
    let fail = |reason: String| {
        error!("Principal bootstrap for user {} failed: {}", id, reason);
        BootstrapError { id, reason }
    };

    if store.find_by_id(id).await.map_err(|e| fail(e.to_string()))?.is_some() {
        debug!("Principal {} already present", id);
        return Ok(());
    }

    let defaults = NewPrincipal::for_tenant(&tenant);
    let principal = store.upsert(id, &defaults).await.map_err(|e| fail(e.to_string()))?;

    info!("Bootstrapped principal {} <{}>", principal.id, principal.email);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Principal;
    use crate::database::DatabaseError;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Counts calls and optionally fails the first `failures` lookups
    #[derive(Default)]
    struct CountingStore {
        finds: AtomicUsize,
        upserts: AtomicUsize,
        failures: AtomicUsize,
        existing: AtomicBool,
    }

    #[async_trait]
    impl PrincipalStore for CountingStore {
        async fn find_by_id(&self, id: i64) -> Result<Option<Principal>, DatabaseError> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;

            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(DatabaseError::Unavailable("connection refused".to_string()));
            }

            if self.existing.load(Ordering::SeqCst) {
                Ok(Some(NewPrincipal::for_tenant(&TenantConfig::default()).into_principal(id)))
            } else {
                Ok(None)
            }
        }

        async fn upsert(&self, id: i64, defaults: &NewPrincipal) -> Result<Principal, DatabaseError> {
            self.upserts.fetch_add(1, Ordering::SeqCst);
            Ok(defaults.clone().into_principal(id))
        }
    }

    fn bootstrap(store: Arc<CountingStore>) -> Arc<PrincipalBootstrap> {
        Arc::new(PrincipalBootstrap::new(store, TenantConfig::default()))
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_creation() {
        let store = Arc::new(CountingStore::default());
        let bootstrap = bootstrap(store.clone());

        let calls = (0..16).map(|_| {
            let bootstrap = bootstrap.clone();
            tokio::spawn(async move { bootstrap.ensure_principal().await })
        });
        for result in futures::future::join_all(calls).await {
            assert!(result.unwrap().is_ok());
        }

        assert_eq!(store.finds.load(Ordering::SeqCst), 1);
        assert_eq!(store.upserts.load(Ordering::SeqCst), 1);
        assert!(bootstrap.is_ready());
    }

    #[tokio::test]
    async fn ready_flag_short_circuits() {
        let store = Arc::new(CountingStore::default());
        let bootstrap = bootstrap(store.clone());

        bootstrap.ensure_principal().await.unwrap();
        bootstrap.ensure_principal().await.unwrap();
        bootstrap.ensure_principal().await.unwrap();

        assert_eq!(store.finds.load(Ordering::SeqCst), 1);
        assert_eq!(store.upserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn existing_row_is_not_recreated() {
        let store = Arc::new(CountingStore::default());
        store.existing.store(true, Ordering::SeqCst);
        let bootstrap = bootstrap(store.clone());

        bootstrap.ensure_principal().await.unwrap();

        assert_eq!(store.upserts.load(Ordering::SeqCst), 0);
        assert!(bootstrap.is_ready());
    }

    #[tokio::test]
    async fn failure_is_shared_then_retried() {
        let store = Arc::new(CountingStore::default());
        store.failures.store(1, Ordering::SeqCst);
        let bootstrap = bootstrap(store.clone());

        let calls = (0..8).map(|_| {
            let bootstrap = bootstrap.clone();
            tokio::spawn(async move { bootstrap.ensure_principal().await })
        });
        for result in futures::future::join_all(calls).await {
            let err = result.unwrap().unwrap_err();
            assert_eq!(err.id, 1);
            assert!(err.reason.contains("connection refused"));
        }
        assert_eq!(store.finds.load(Ordering::SeqCst), 1);
        assert!(!bootstrap.is_ready());

        bootstrap.ensure_principal().await.unwrap();
        assert_eq!(store.finds.load(Ordering::SeqCst), 2);
        assert_eq!(store.upserts.load(Ordering::SeqCst), 1);
        assert!(bootstrap.is_ready());
    }
}
