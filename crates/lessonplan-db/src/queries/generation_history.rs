//! Database query functions for the `generation_history` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{GenerationRecord, GenerationStatus};

/// Number of history rows returned when the caller gives no limit.
pub const DEFAULT_HISTORY_LIMIT: i64 = 20;

/// Parameters for recording one generation attempt.
#[derive(Debug, Clone)]
pub struct NewGenerationRecord<'a> {
    pub owner_id: Uuid,
    pub lesson_plan_id: Option<Uuid>,
    pub request: &'a serde_json::Value,
    pub model: &'a str,
    pub status: GenerationStatus,
    pub error_message: Option<&'a str>,
    pub elapsed_ms: i32,
}

/// The owner's most recent history rows plus the owner's total row count.
#[derive(Debug, Clone)]
pub struct GenerationHistoryPage {
    pub total: i64,
    pub records: Vec<GenerationRecord>,
}

/// Insert a history row.
pub async fn insert_generation_record(
    pool: &PgPool,
    new: &NewGenerationRecord<'_>,
) -> Result<GenerationRecord> {
    let record = sqlx::query_as::<_, GenerationRecord>(
        "INSERT INTO generation_history (owner_id, lesson_plan_id, request, model, status, \
         error_message, elapsed_ms) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING *",
    )
    .bind(new.owner_id)
    .bind(new.lesson_plan_id)
    .bind(new.request)
    .bind(new.model)
    .bind(new.status)
    .bind(new.error_message)
    .bind(new.elapsed_ms)
    .fetch_one(pool)
    .await
    .context("failed to insert generation record")?;

    Ok(record)
}

/// List the owner's history, newest first. `limit` defaults to
/// [`DEFAULT_HISTORY_LIMIT`].
pub async fn list_generation_history(
    pool: &PgPool,
    owner_id: Uuid,
    limit: Option<i64>,
) -> Result<GenerationHistoryPage> {
    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM generation_history WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await
            .context("failed to count generation history")?;

    let records = sqlx::query_as::<_, GenerationRecord>(
        "SELECT * FROM generation_history \
         WHERE owner_id = $1 \
         ORDER BY created_at DESC, id \
         LIMIT $2",
    )
    .bind(owner_id)
    .bind(limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
    .fetch_all(pool)
    .await
    .context("failed to list generation history")?;

    Ok(GenerationHistoryPage { total, records })
}

/// Delete every history row belonging to the owner. Returns the number of
/// rows removed.
pub async fn clear_generation_history(pool: &PgPool, owner_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM generation_history WHERE owner_id = $1")
        .bind(owner_id)
        .execute(pool)
        .await
        .context("failed to clear generation history")?;

    Ok(result.rows_affected())
}
