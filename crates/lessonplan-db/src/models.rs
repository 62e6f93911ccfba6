use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// School stage a lesson plan targets.
///
/// Stored as a snake_case key; [`GradeLevel::label`] gives the Portuguese
/// name shown to teachers and used in prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GradeLevel {
    EarlyChildhood,
    ElementaryEarly,
    ElementaryLate,
    HighSchool,
}

impl GradeLevel {
    pub const ALL: [GradeLevel; 4] = [
        Self::EarlyChildhood,
        Self::ElementaryEarly,
        Self::ElementaryLate,
        Self::HighSchool,
    ];

    /// Stored key, e.g. `elementary_early`.
    pub fn key(self) -> &'static str {
        match self {
            Self::EarlyChildhood => "early_childhood",
            Self::ElementaryEarly => "elementary_early",
            Self::ElementaryLate => "elementary_late",
            Self::HighSchool => "high_school",
        }
    }

    /// Human-readable name, e.g. `Ensino Fundamental I`.
    pub fn label(self) -> &'static str {
        match self {
            Self::EarlyChildhood => "Educação Infantil",
            Self::ElementaryEarly => "Ensino Fundamental I",
            Self::ElementaryLate => "Ensino Fundamental II",
            Self::HighSchool => "Ensino Médio",
        }
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GradeLevel {
    type Err = GradeLevelParseError;

    /// Accepts either the stored key or the exact Portuguese label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.key() == trimmed || level.label() == trimmed)
            .ok_or_else(|| GradeLevelParseError(s.to_owned()))
    }
}

/// Error returned when parsing an invalid [`GradeLevel`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid grade level {0:?} (expected one of: Educação Infantil, Ensino Fundamental I, Ensino Fundamental II, Ensino Médio)")]
pub struct GradeLevelParseError(pub String);

// ---------------------------------------------------------------------------

/// Outcome of one generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Success,
    Error,
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

impl FromStr for GenerationStatus {
    type Err = GenerationStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            other => Err(GenerationStatusParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`GenerationStatus`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid generation status: {0:?}")]
pub struct GenerationStatusParseError(pub String);

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A generated lesson plan, one column per section.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LessonPlan {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub topic: String,
    pub subject: Option<String>,
    pub grade_level: GradeLevel,
    pub duration_minutes: i32,
    pub standards_code: Option<String>,
    pub notes: Option<String>,
    pub introduction: String,
    pub objective: String,
    pub steps: String,
    pub rubric: String,
    pub model: String,
    pub total_tokens: i32,
    pub generation_ms: i32,
    pub created_at: DateTime<Utc>,
}

/// One generation attempt recorded in the history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GenerationRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub lesson_plan_id: Option<Uuid>,
    pub request: serde_json::Value,
    pub model: String,
    pub status: GenerationStatus,
    pub error_message: Option<String>,
    pub elapsed_ms: i32,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
