//! The four lesson-plan sections and how they are read out of a completion.
//!
//! [`LessonPlanSections::from_completion`] is the only entry point the rest
//! of the crate uses: it runs the canonical [`SectionExtractor`] and swaps
//! every empty section for [`PLACEHOLDER`], logging which ones were missing.
//! Unparseable model output therefore degrades to placeholder text instead
//! of failing the generation.

pub mod extractor;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use lessonplan_db::models::LessonPlan;

pub use extractor::{SectionExtractor, extract_sections};

/// Text stored in place of a section whose header was not found.
pub const PLACEHOLDER: &str = "Não foi possível gerar esta seção.";

/// Logical section names, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    Introduction,
    Objective,
    Steps,
    Rubric,
}

impl SectionKey {
    pub const ALL: [SectionKey; 4] = [
        Self::Introduction,
        Self::Objective,
        Self::Steps,
        Self::Rubric,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::Objective => "objective",
            Self::Steps => "steps",
            Self::Rubric => "rubric",
        }
    }

    /// The header the model is told to emit for this section.
    pub fn header(self) -> &'static str {
        match self {
            Self::Introduction => "INTRODUÇÃO LÚDICA",
            Self::Objective => "OBJETIVO DE APRENDIZAGEM",
            Self::Steps => "PASSO A PASSO DA ATIVIDADE",
            Self::Rubric => "RUBRICA DE AVALIAÇÃO",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(key, header)` pairs in the order the model is asked to write them.
pub const CANONICAL_SECTIONS: [(SectionKey, &str); 4] = [
    (SectionKey::Introduction, "INTRODUÇÃO LÚDICA"),
    (SectionKey::Objective, "OBJETIVO DE APRENDIZAGEM"),
    (SectionKey::Steps, "PASSO A PASSO DA ATIVIDADE"),
    (SectionKey::Rubric, "RUBRICA DE AVALIAÇÃO"),
];

static CANONICAL_EXTRACTOR: LazyLock<SectionExtractor<SectionKey>> = LazyLock::new(|| {
    SectionExtractor::new(&CANONICAL_SECTIONS).expect("canonical headers compile as literals")
});

/// Extract the canonical sections without placeholder substitution.
///
/// Missing sections map to `""`.
pub fn extract_raw(text: &str) -> BTreeMap<SectionKey, String> {
    CANONICAL_EXTRACTOR.extract(text)
}

/// A lesson plan split into its four sections. No field is ever empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPlanSections {
    pub introduction: String,
    pub objective: String,
    pub steps: String,
    pub rubric: String,
}

impl LessonPlanSections {
    /// Split a raw completion, substituting [`PLACEHOLDER`] for every
    /// section that came back empty.
    pub fn from_completion(text: &str) -> Self {
        let mut raw = extract_raw(text);

        let missing: Vec<&str> = SectionKey::ALL
            .into_iter()
            .filter(|key| raw.get(key).is_none_or(|body| body.is_empty()))
            .map(SectionKey::as_str)
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "sections not found in completion, using placeholder");
        }

        let mut take = |key: SectionKey| match raw.remove(&key) {
            Some(body) if !body.is_empty() => body,
            _ => PLACEHOLDER.to_owned(),
        };

        Self {
            introduction: take(SectionKey::Introduction),
            objective: take(SectionKey::Objective),
            steps: take(SectionKey::Steps),
            rubric: take(SectionKey::Rubric),
        }
    }

    pub fn get(&self, key: SectionKey) -> &str {
        match key {
            SectionKey::Introduction => &self.introduction,
            SectionKey::Objective => &self.objective,
            SectionKey::Steps => &self.steps,
            SectionKey::Rubric => &self.rubric,
        }
    }

    /// Sections that hold the placeholder.
    pub fn placeholders(&self) -> Vec<SectionKey> {
        SectionKey::ALL
            .into_iter()
            .filter(|key| self.get(*key) == PLACEHOLDER)
            .collect()
    }

    /// Iterate `(key, body)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionKey, &str)> {
        SectionKey::ALL.into_iter().map(|key| (key, self.get(key)))
    }
}

impl From<&LessonPlan> for LessonPlanSections {
    fn from(plan: &LessonPlan) -> Self {
        Self {
            introduction: plan.introduction.clone(),
            objective: plan.objective.clone(),
            steps: plan.steps.clone(),
            rubric: plan.rubric.clone(),
        }
    }
}
