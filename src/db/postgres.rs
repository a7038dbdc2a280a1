use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{not_found, ReturnStore};
use crate::error::{AppError, AppResult};
use crate::models::{NewReturn, RefundMode, Return, ReturnStatus};

pub struct PgReturnStore {
    pool: PgPool,
}

impl PgReturnStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw `retur` row; enums are stored as text.
#[derive(Debug, sqlx::FromRow)]
struct ReturnRow {
    id: i64,
    item: String,
    reason: String,
    status: String,
    refund_mode: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReturnRow> for Return {
    type Error = AppError;

    fn try_from(row: ReturnRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ReturnStatus>()
            .map_err(|e| AppError::storage(format!("row {}: {}", row.id, e)))?;
        let refund_mode = row
            .refund_mode
            .as_deref()
            .map(str::parse::<RefundMode>)
            .transpose()
            .map_err(|e| AppError::storage(format!("row {}: {}", row.id, e)))?;

        Ok(Return {
            id: row.id,
            item: row.item,
            reason: row.reason,
            status,
            refund_mode,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_returns(rows: Vec<ReturnRow>) -> AppResult<Vec<Return>> {
    rows.into_iter().map(Return::try_from).collect()
}

#[async_trait]
impl ReturnStore for PgReturnStore {
    async fn fetch_all(&self) -> AppResult<Vec<Return>> {
        let rows = sqlx::query_as::<_, ReturnRow>(
            "SELECT id, item, reason, status, refund_mode, created_at, updated_at
             FROM retur ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        into_returns(rows)
    }

    async fn fetch_by_id(&self, id: i64) -> AppResult<Return> {
        sqlx::query_as::<_, ReturnRow>(
            "SELECT id, item, reason, status, refund_mode, created_at, updated_at
             FROM retur WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))?
        .try_into()
    }

    async fn insert(&self, candidate: &NewReturn) -> AppResult<Return> {
        sqlx::query_as::<_, ReturnRow>(
            r#"
            INSERT INTO retur (item, reason, status, refund_mode)
            VALUES ($1, $2, $3, $4)
            RETURNING id, item, reason, status, refund_mode, created_at, updated_at
            "#,
        )
        .bind(&candidate.item)
        .bind(&candidate.reason)
        .bind(candidate.status.as_str())
        .bind(candidate.refund_mode.map(|m| m.as_str()))
        .fetch_one(&self.pool)
        .await?
        .try_into()
    }

    async fn insert_batch(&self, candidates: &[NewReturn]) -> AppResult<Vec<Return>> {
        let mut items: Vec<String> = Vec::with_capacity(candidates.len());
        let mut reasons: Vec<String> = Vec::with_capacity(candidates.len());
        let mut statuses: Vec<String> = Vec::with_capacity(candidates.len());
        let mut refund_modes: Vec<Option<String>> = Vec::with_capacity(candidates.len());

        for c in candidates {
            items.push(c.item.clone());
            reasons.push(c.reason.clone());
            statuses.push(c.status.as_str().to_string());
            refund_modes.push(c.refund_mode.map(|m| m.as_str().to_string()));
        }

        // UNNEST keeps the whole batch in one round trip
        let rows = sqlx::query_as::<_, ReturnRow>(
            r#"
            INSERT INTO retur (item, reason, status, refund_mode)
            SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::text[])
            RETURNING id, item, reason, status, refund_mode, created_at, updated_at
            "#,
        )
        .bind(&items)
        .bind(&reasons)
        .bind(&statuses)
        .bind(&refund_modes)
        .fetch_all(&self.pool)
        .await?;

        into_returns(rows)
    }

    async fn approve(&self, id: i64, refund_mode: RefundMode) -> AppResult<Return> {
        sqlx::query_as::<_, ReturnRow>(
            r#"
            UPDATE retur
            SET status      = 'Approved',
                refund_mode = $1,
                updated_at  = NOW()
            WHERE id = $2
            RETURNING id, item, reason, status, refund_mode, created_at, updated_at
            "#,
        )
        .bind(refund_mode.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))?
        .try_into()
    }

    async fn delete(&self, id: i64) -> AppResult<Return> {
        sqlx::query_as::<_, ReturnRow>(
            r#"
            DELETE FROM retur WHERE id = $1
            RETURNING id, item, reason, status, refund_mode, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))?
        .try_into()
    }

    async fn count(&self) -> AppResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM retur")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
