//! Request validation: raw form fields in, [`GenerationRequest`] out.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lessonplan_db::models::{GradeLevel, GradeLevelParseError};

/// Errors from validating a [`RequestForm`].
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("topic is required")]
    MissingTopic,

    #[error(transparent)]
    InvalidGradeLevel(#[from] GradeLevelParseError),

    #[error("duration must be a positive number of minutes, got {0}")]
    InvalidDuration(i64),

    #[error(
        "invalid standards code {0:?} (expected 2 letters + 2 digits + 2 letters + 2 digits, e.g. EF05MA01)"
    )]
    InvalidStandardsCode(String),
}

static STANDARDS_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Z]{2}[0-9]{2}$").expect("standards code pattern is valid")
});

/// A BNCC skill code such as `EF05MA01`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StandardsCode(String);

impl StandardsCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for StandardsCode {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if STANDARDS_CODE.is_match(trimmed) {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(RequestError::InvalidStandardsCode(s.to_owned()))
        }
    }
}

impl TryFrom<String> for StandardsCode {
    type Error = RequestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StandardsCode> for String {
    fn from(code: StandardsCode) -> Self {
        code.0
    }
}

impl fmt::Display for StandardsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unvalidated input as it arrives from a form or the command line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestForm {
    pub topic: String,
    pub grade_level: String,
    pub duration_minutes: i64,
    pub standards_code: Option<String>,
    pub notes: Option<String>,
    pub subject: Option<String>,
}

impl RequestForm {
    /// Validate every field. Blank optional fields become `None`.
    pub fn validate(self) -> Result<GenerationRequest, RequestError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(RequestError::MissingTopic);
        }

        let grade_level: GradeLevel = self.grade_level.parse()?;

        let duration_minutes = u32::try_from(self.duration_minutes)
            .ok()
            .filter(|minutes| *minutes > 0 && i32::try_from(*minutes).is_ok())
            .ok_or(RequestError::InvalidDuration(self.duration_minutes))?;

        let standards_code = non_blank(self.standards_code)
            .map(|code| code.parse::<StandardsCode>())
            .transpose()?;

        Ok(GenerationRequest {
            topic: topic.to_owned(),
            grade_level,
            duration_minutes,
            standards_code,
            notes: non_blank(self.notes),
            subject: non_blank(self.subject),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// A validated generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    pub grade_level: GradeLevel,
    /// Always positive and representable as `i32`.
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standards_code: Option<StandardsCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Persisted with the plan; not part of the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}
