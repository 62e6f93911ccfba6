//! Database query functions for the `lesson_plans` table.
//!
//! Every read and delete takes the owner id and filters on it.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{GradeLevel, LessonPlan};

/// Parameters for inserting a new lesson plan row.
#[derive(Debug, Clone)]
pub struct NewLessonPlan<'a> {
    pub owner_id: Uuid,
    pub topic: &'a str,
    pub subject: Option<&'a str>,
    pub grade_level: GradeLevel,
    pub duration_minutes: i32,
    pub standards_code: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub introduction: &'a str,
    pub objective: &'a str,
    pub steps: &'a str,
    pub rubric: &'a str,
    pub model: &'a str,
    pub total_tokens: i32,
    pub generation_ms: i32,
}

/// Optional narrowing for [`list_lesson_plans`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LessonPlanFilter {
    pub grade_level: Option<GradeLevel>,
    pub limit: Option<i64>,
}

/// One page of an owner's plans plus the number of plans matching the
/// filter (ignoring the limit).
#[derive(Debug, Clone)]
pub struct LessonPlanPage {
    pub total: i64,
    pub plans: Vec<LessonPlan>,
}

/// Insert a new lesson plan. Returns the row with server-generated defaults
/// (id, created_at).
pub async fn insert_lesson_plan(pool: &PgPool, new: &NewLessonPlan<'_>) -> Result<LessonPlan> {
    let plan = sqlx::query_as::<_, LessonPlan>(
        "INSERT INTO lesson_plans (owner_id, topic, subject, grade_level, duration_minutes, \
         standards_code, notes, introduction, objective, steps, rubric, model, \
         total_tokens, generation_ms) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
         RETURNING *",
    )
    .bind(new.owner_id)
    .bind(new.topic)
    .bind(new.subject)
    .bind(new.grade_level)
    .bind(new.duration_minutes)
    .bind(new.standards_code)
    .bind(new.notes)
    .bind(new.introduction)
    .bind(new.objective)
    .bind(new.steps)
    .bind(new.rubric)
    .bind(new.model)
    .bind(new.total_tokens)
    .bind(new.generation_ms)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert lesson plan {:?}", new.topic))?;

    Ok(plan)
}

/// Fetch one of the owner's plans. Plans owned by someone else are reported
/// as absent.
pub async fn get_lesson_plan(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<Option<LessonPlan>> {
    let plan = sqlx::query_as::<_, LessonPlan>(
        "SELECT * FROM lesson_plans WHERE id = $1 AND owner_id = $2",
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch lesson plan")?;

    Ok(plan)
}

/// List the owner's plans, newest first.
pub async fn list_lesson_plans(
    pool: &PgPool,
    owner_id: Uuid,
    filter: LessonPlanFilter,
) -> Result<LessonPlanPage> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM lesson_plans \
         WHERE owner_id = $1 AND ($2::text IS NULL OR grade_level = $2)",
    )
    .bind(owner_id)
    .bind(filter.grade_level)
    .fetch_one(pool)
    .await
    .context("failed to count lesson plans")?;

    // LIMIT NULL means no limit in PostgreSQL.
    let plans = sqlx::query_as::<_, LessonPlan>(
        "SELECT * FROM lesson_plans \
         WHERE owner_id = $1 AND ($2::text IS NULL OR grade_level = $2) \
         ORDER BY created_at DESC, id \
         LIMIT $3",
    )
    .bind(owner_id)
    .bind(filter.grade_level)
    .bind(filter.limit)
    .fetch_all(pool)
    .await
    .context("failed to list lesson plans")?;

    Ok(LessonPlanPage { total, plans })
}

/// Delete one of the owner's plans. Returns `false` when no row matched,
/// either because the id is unknown or because the plan belongs to someone
/// else.
pub async fn delete_lesson_plan(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM lesson_plans WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await
        .context("failed to delete lesson plan")?;

    Ok(result.rows_affected() > 0)
}
