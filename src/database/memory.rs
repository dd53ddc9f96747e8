use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Holding, HoldingDraft, HoldingKind, NewPrincipal, Principal};
use crate::database::repository::{HoldingStore, PrincipalStore};

#[derive(Default)]
struct Tables {
    users: HashMap<i64, Principal>,
    holdings: HashMap<Uuid, Holding>,
}

/// Process-local store for `serve --in-memory` and tests
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    principal_inserts: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of principal rows actually inserted
    pub fn principal_inserts(&self) -> usize {
        self.principal_inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Principal>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn upsert(&self, id: i64, defaults: &NewPrincipal) -> Result<Principal, DatabaseError> {
        let mut tables = self.tables.write().await;
        let principal = tables.users.entry(id).or_insert_with(|| {
            self.principal_inserts.fetch_add(1, Ordering::SeqCst);
            defaults.clone().into_principal(id)
        });
        Ok(principal.clone())
    }
}

#[async_trait]
impl HoldingStore for MemoryStore {
    async fn list(&self, user_id: i64, kind: Option<HoldingKind>) -> Result<Vec<Holding>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut holdings: Vec<Holding> = tables
            .holdings
            .values()
            .filter(|h| h.user_id == user_id)
            .filter(|h| kind.map_or(true, |k| h.kind == k))
            .cloned()
            .collect();
        holdings.sort_by(|a, b| a.kind.as_str().cmp(b.kind.as_str()).then_with(|| a.name.cmp(&b.name)));
        Ok(holdings)
    }

    async fn get(&self, user_id: i64, id: Uuid) -> Result<Option<Holding>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.holdings.get(&id).filter(|h| h.user_id == user_id).cloned())
    }

    async fn create(&self, user_id: i64, draft: &HoldingDraft) -> Result<Holding, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(DatabaseError::NotFound(format!("user {} does not exist", user_id)));
        }
        let holding = Holding::from_draft(user_id, draft);
        tables.holdings.insert(holding.id, holding.clone());
        Ok(holding)
    }

    async fn update(&self, user_id: i64, id: Uuid, draft: &HoldingDraft) -> Result<Option<Holding>, DatabaseError> {
        let mut tables = self.tables.write().await;
        match tables.holdings.get_mut(&id) {
            Some(holding) if holding.user_id == user_id => {
                holding.apply(draft);
                Ok(Some(holding.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, user_id: i64, id: Uuid) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let owned = tables.holdings.get(&id).is_some_and(|h| h.user_id == user_id);
        if owned {
            tables.holdings.remove(&id);
        }
        Ok(owned)
    }
}
