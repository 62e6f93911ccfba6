//! End-to-end plan generation: validate, prompt, complete, split, persist.
//!
//! Every attempt that reaches the provider leaves one row in
//! `generation_history`, whether it succeeded or not. Invalid requests are
//! rejected before anything is recorded.

use std::time::{Duration, Instant};

use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use lessonplan_db::models::{GenerationStatus, LessonPlan};
use lessonplan_db::queries::generation_history::{self, NewGenerationRecord};
use lessonplan_db::queries::lesson_plans::{self, NewLessonPlan};

use crate::completion::{CompletionError, CompletionProvider, GenerationParams};
use crate::prompt::{GenerationRequest, RequestError, RequestForm, build_prompt};
use crate::sections::LessonPlanSections;

/// Errors from [`generate_lesson_plan`].
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    InvalidRequest(#[from] RequestError),

    #[error("lesson plan generation failed: {0}")]
    Completion(#[from] CompletionError),

    /// The provider answered but the plan could not be stored. The
    /// generated sections are handed back so the caller can still show them.
    #[error("plan generated but not saved: {source:#}")]
    Persist {
        sections: Box<LessonPlanSections>,
        #[source]
        source: anyhow::Error,
    },
}

/// Timing and usage for one successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationMetadata {
    pub model: String,
    pub total_tokens: u32,
    /// Time spent waiting on the provider.
    pub generation_ms: u64,
    /// Wall time for the whole call, storage included.
    pub total_ms: u64,
}

/// A stored plan together with its sections and generation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPlan {
    pub plan: LessonPlan,
    pub sections: LessonPlanSections,
    pub metadata: GenerationMetadata,
}

/// Generate a lesson plan for `owner_id` and store it.
pub async fn generate_lesson_plan(
    pool: &PgPool,
    provider: &dyn CompletionProvider,
    owner_id: Uuid,
    form: RequestForm,
) -> Result<GeneratedPlan, GenerationError> {
    let request = form.validate()?;
    generate_validated(pool, provider, owner_id, &request).await
}

/// Same as [`generate_lesson_plan`] for an already validated request.
pub async fn generate_validated(
    pool: &PgPool,
    provider: &dyn CompletionProvider,
    owner_id: Uuid,
    request: &GenerationRequest,
) -> Result<GeneratedPlan, GenerationError> {
    let started = Instant::now();
    let request_json = serde_json::to_value(request).unwrap_or_default();
    let history = HistoryWriter {
        pool,
        owner_id,
        request: &request_json,
        model: provider.model(),
    };

    info!(
        owner = %owner_id,
        provider = provider.name(),
        topic = %request.topic,
        grade_level = %request.grade_level,
        "generating lesson plan"
    );

    let prompt = build_prompt(request);
    let completion = match provider
        .complete(&prompt, &GenerationParams::default())
        .await
    {
        Ok(completion) => completion,
        Err(err) => {
            error!(owner = %owner_id, error = %err, "completion provider failed");
            history
                .record(GenerationStatus::Error, None, Some(&err.to_string()), started.elapsed())
                .await;
            return Err(err.into());
        }
    };
    let generation_time = started.elapsed();

    let sections = LessonPlanSections::from_completion(&completion.text);

    let new_plan = NewLessonPlan {
        owner_id,
        topic: &request.topic,
        subject: request.subject.as_deref(),
        grade_level: request.grade_level,
        duration_minutes: saturating_i32(u64::from(request.duration_minutes)),
        standards_code: request.standards_code.as_ref().map(|code| code.as_str()),
        notes: request.notes.as_deref(),
        introduction: &sections.introduction,
        objective: &sections.objective,
        steps: &sections.steps,
        rubric: &sections.rubric,
        model: &completion.model,
        total_tokens: saturating_i32(u64::from(completion.total_tokens)),
        generation_ms: millis_i32(generation_time),
    };

    let plan = match lesson_plans::insert_lesson_plan(pool, &new_plan).await {
        Ok(plan) => plan,
        Err(source) => {
            error!(owner = %owner_id, error = %format!("{source:#}"), "failed to store lesson plan");
            let message = format!("plan generated but not saved: {source:#}");
            history
                .record(GenerationStatus::Error, None, Some(&message), started.elapsed())
                .await;
            return Err(GenerationError::Persist {
                sections: Box::new(sections),
                source,
            });
        }
    };

    history
        .record(GenerationStatus::Success, Some(plan.id), None, started.elapsed())
        .await;

    let metadata = GenerationMetadata {
        model: completion.model,
        total_tokens: completion.total_tokens,
        generation_ms: duration_ms(generation_time),
        total_ms: duration_ms(started.elapsed()),
    };

    info!(
        owner = %owner_id,
        plan_id = %plan.id,
        model = %metadata.model,
        total_tokens = metadata.total_tokens,
        generation_ms = metadata.generation_ms,
        "lesson plan stored"
    );

    Ok(GeneratedPlan {
        plan,
        sections,
        metadata,
    })
}

/// Writes history rows for one generation attempt. Failures are logged and
/// swallowed.
struct HistoryWriter<'a> {
    pool: &'a PgPool,
    owner_id: Uuid,
    request: &'a serde_json::Value,
    model: &'a str,
}

impl HistoryWriter<'_> {
    async fn record(
        &self,
        status: GenerationStatus,
        lesson_plan_id: Option<Uuid>,
        error_message: Option<&str>,
        elapsed: Duration,
    ) {
        let record = NewGenerationRecord {
            owner_id: self.owner_id,
            lesson_plan_id,
            request: self.request,
            model: self.model,
            status,
            error_message,
            elapsed_ms: millis_i32(elapsed),
        };

        if let Err(err) = generation_history::insert_generation_record(self.pool, &record).await {
            warn!(
                owner = %self.owner_id,
                status = %status,
                error = %format!("{err:#}"),
                "failed to record generation history"
            );
        }
    }
}

fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

fn millis_i32(elapsed: Duration) -> i32 {
    saturating_i32(duration_ms(elapsed))
}

fn saturating_i32(value: u64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
