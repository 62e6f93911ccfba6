//! `lessonplan generate`: run the generation service and print the result.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use lessonplan_core::completion::CompletionProvider;
use lessonplan_core::generation::{GeneratedPlan, GenerationError, generate_validated};
use lessonplan_core::prompt::{GenerationRequest, RequestForm};
use lessonplan_core::sections::LessonPlanSections;

use crate::plan_cmds::{format_plan, format_sections};

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Lesson topic (e.g. "Frações")
    #[arg(long)]
    pub topic: String,
    /// Grade level key (early_childhood, elementary_early, elementary_late,
    /// high_school) or its Portuguese name
    #[arg(long)]
    pub grade_level: String,
    /// Lesson duration in minutes
    #[arg(long = "duration", allow_negative_numbers = true)]
    pub duration_minutes: i64,
    /// BNCC skill code (e.g. EF05MA01)
    #[arg(long)]
    pub standards_code: Option<String>,
    /// Free-form notes for the model
    #[arg(long)]
    pub notes: Option<String>,
    /// School subject, stored with the plan
    #[arg(long)]
    pub subject: Option<String>,
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl GenerateArgs {
    pub fn to_form(&self) -> RequestForm {
        RequestForm {
            topic: self.topic.clone(),
            grade_level: self.grade_level.clone(),
            duration_minutes: self.duration_minutes,
            standards_code: self.standards_code.clone(),
            notes: self.notes.clone(),
            subject: self.subject.clone(),
        }
    }
}

/// Validate the arguments without touching the database or the provider.
pub fn validate(args: &GenerateArgs) -> Result<GenerationRequest> {
    args.to_form()
        .validate()
        .context("invalid generation request")
}

#[derive(Serialize)]
struct UnsavedOutput<'a> {
    saved: bool,
    error: String,
    sections: &'a LessonPlanSections,
}

pub async fn run_generate(
    pool: &PgPool,
    provider: &dyn CompletionProvider,
    owner_id: Uuid,
    request: &GenerationRequest,
    json: bool,
) -> Result<()> {
    match generate_validated(pool, provider, owner_id, request).await {
        Ok(generated) => {
            print_generated(&generated, json)?;
            Ok(())
        }
        Err(GenerationError::Persist { sections, source }) => {
            // The plan is lost once we exit, so show it before failing.
            let error = format!("plan generated but not saved: {source:#}");
            if json {
                let output = UnsavedOutput {
                    saved: false,
                    error: error.clone(),
                    sections: &sections,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print!("{}", format_sections(&sections));
            }
            anyhow::bail!(error)
        }
        Err(err) => Err(err.into()),
    }
}

fn print_generated(generated: &GeneratedPlan, json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(generated).context("failed to serialize lesson plan")?;
        println!("{rendered}");
        return Ok(());
    }

    print!("{}", format_plan(&generated.plan));
    let placeholders = generated.sections.placeholders();
    if !placeholders.is_empty() {
        let names: Vec<&str> = placeholders.iter().map(|key| key.header()).collect();
        eprintln!();
        eprintln!("Warning: the model did not produce: {}", names.join(", "));
    }
    eprintln!(
        "Generated in {} ms ({} ms total).",
        generated.metadata.generation_ms, generated.metadata.total_ms
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: GenerateArgs,
    }

    fn parse(argv: &[&str]) -> GenerateArgs {
        let mut full = vec!["generate"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).unwrap().args
    }

    #[test]
    fn valid_arguments_validate() {
        let args = parse(&[
            "--topic",
            "Frações",
            "--grade-level",
            "Ensino Fundamental I",
            "--duration",
            "50",
            "--standards-code",
            "EF05MA01",
        ]);
        let request = validate(&args).unwrap();
        assert_eq!(request.topic, "Frações");
        assert_eq!(request.duration_minutes, 50);
        assert_eq!(request.standards_code.unwrap().as_str(), "EF05MA01");
        assert!(!args.json);
    }

    #[test]
    fn invalid_arguments_are_rejected_before_generation() {
        let args = parse(&[
            "--topic",
            "Frações",
            "--grade-level",
            "elementary_early",
            "--duration",
            "-5",
        ]);
        let err = validate(&args).unwrap_err();
        assert!(format!("{err:#}").contains("invalid generation request"));

        let args = parse(&[
            "--topic",
            "Frações",
            "--grade-level",
            "university",
            "--duration",
            "50",
        ]);
        assert!(validate(&args).is_err());
    }
}
