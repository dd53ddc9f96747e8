use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::holding::HoldingRow;
use crate::database::models::{Holding, HoldingDraft, HoldingKind, NewPrincipal, Principal};

/// Storage for the single `users` row the auth gate depends on
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Principal>, DatabaseError>;

    /// Create the row if absent, leave it untouched if present
    async fn upsert(&self, id: i64, defaults: &NewPrincipal) -> Result<Principal, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Holdings are always scoped to the owning user id
#[async_trait]
pub trait HoldingStore: Send + Sync {
    async fn list(&self, user_id: i64, kind: Option<HoldingKind>) -> Result<Vec<Holding>, DatabaseError>;
    async fn get(&self, user_id: i64, id: Uuid) -> Result<Option<Holding>, DatabaseError>;
    async fn create(&self, user_id: i64, draft: &HoldingDraft) -> Result<Holding, DatabaseError>;
    async fn update(&self, user_id: i64, id: Uuid, draft: &HoldingDraft) -> Result<Option<Holding>, DatabaseError>;
    async fn delete(&self, user_id: i64, id: Uuid) -> Result<bool, DatabaseError>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

const HOLDING_COLUMNS: &str =
    "id, user_id, kind, name, symbol, quantity, unit_value, currency, notes, created_at, updated_at";

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_holding(row: HoldingRow) -> Result<Holding, DatabaseError> {
    Holding::try_from(row).map_err(|e| DatabaseError::Sqlx(sqlx::Error::Decode(e.into())))
}

#[async_trait]
impl PrincipalStore for PgStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Principal>, DatabaseError> {
        let principal = sqlx::query_as::<_, Principal>(
            "SELECT id, email, name, auth_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(principal)
    }

    async fn upsert(&self, id: i64, defaults: &NewPrincipal) -> Result<Principal, DatabaseError> {
        sqlx::query(
            "INSERT INTO users (id, email, name, auth_hash) VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(&defaults.email)
        .bind(&defaults.name)
        .bind(&defaults.auth_hash)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {} missing after upsert", id)))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

#[async_trait]
impl HoldingStore for PgStore {
    async fn list(&self, user_id: i64, kind: Option<HoldingKind>) -> Result<Vec<Holding>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM holdings WHERE user_id = $1 AND ($2::TEXT IS NULL OR kind = $2) ORDER BY kind, name",
            HOLDING_COLUMNS
        );
        let rows = sqlx::query_as::<_, HoldingRow>(&sql)
            .bind(user_id)
            .bind(kind.map(|k| k.as_str()))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(into_holding).collect()
    }

    async fn get(&self, user_id: i64, id: Uuid) -> Result<Option<Holding>, DatabaseError> {
        let sql = format!("SELECT {} FROM holdings WHERE id = $1 AND user_id = $2", HOLDING_COLUMNS);
        let row = sqlx::query_as::<_, HoldingRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(into_holding).transpose()
    }

    async fn create(&self, user_id: i64, draft: &HoldingDraft) -> Result<Holding, DatabaseError> {
        let sql = format!(
            "INSERT INTO holdings (id, user_id, kind, name, symbol, quantity, unit_value, currency, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {}",
            HOLDING_COLUMNS
        );
        let row = sqlx::query_as::<_, HoldingRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(draft.kind.as_str())
            .bind(&draft.name)
            .bind(&draft.symbol)
            .bind(draft.quantity)
            .bind(draft.unit_value)
            .bind(&draft.currency)
            .bind(&draft.notes)
            .fetch_one(&self.pool)
            .await?;

        into_holding(row)
    }

    async fn update(&self, user_id: i64, id: Uuid, draft: &HoldingDraft) -> Result<Option<Holding>, DatabaseError> {
        let sql = format!(
            "UPDATE holdings
             SET kind = $3, name = $4, symbol = $5, quantity = $6, unit_value = $7,
                 currency = $8, notes = $9, updated_at = now()
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            HOLDING_COLUMNS
        );
        let row = sqlx::query_as::<_, HoldingRow>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(draft.kind.as_str())
            .bind(&draft.name)
            .bind(&draft.symbol)
            .bind(draft.quantity)
            .bind(draft.unit_value)
            .bind(&draft.currency)
            .bind(&draft.notes)
            .fetch_optional(&self.pool)
            .await?;

        row.map(into_holding).transpose()
    }

    async fn delete(&self, user_id: i64, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM holdings WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
