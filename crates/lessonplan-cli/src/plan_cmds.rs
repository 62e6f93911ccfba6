//! CLI handlers for `lessonplan plan` subcommands.
//!
//! Implements:
//! - `lessonplan plan list [--grade-level] [--limit]` -- newest plans first
//! - `lessonplan plan show <plan-id> [--json]`        -- one plan with its sections
//! - `lessonplan plan delete <plan-id>`               -- remove a plan

use std::fmt::Write as _;

use anyhow::{Context, Result, bail};
use sqlx::PgPool;
use uuid::Uuid;

use lessonplan_core::sections::LessonPlanSections;
use lessonplan_db::models::{GradeLevel, LessonPlan};
use lessonplan_db::queries::lesson_plans::{self as plan_queries, LessonPlanFilter};

use crate::PlanCommands;

const TOPIC_WIDTH: usize = 40;

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(command: PlanCommands, pool: &PgPool, owner_id: Uuid) -> Result<()> {
    match command {
        PlanCommands::List { grade_level, limit } => {
            cmd_list(pool, owner_id, grade_level.as_deref(), limit).await
        }
        PlanCommands::Show { plan_id, json } => cmd_show(pool, owner_id, &plan_id, json).await,
        PlanCommands::Delete { plan_id } => cmd_delete(pool, owner_id, &plan_id).await,
    }
}

pub fn parse_plan_id(raw: &str) -> Result<Uuid> {
    raw.trim()
        .parse()
        .with_context(|| format!("invalid plan ID: {raw:?}"))
}

// -----------------------------------------------------------------------
// lessonplan plan list
// -----------------------------------------------------------------------

async fn cmd_list(
    pool: &PgPool,
    owner_id: Uuid,
    grade_level: Option<&str>,
    limit: Option<i64>,
) -> Result<()> {
    let grade_level = grade_level
        .map(str::parse::<GradeLevel>)
        .transpose()?;

    let page =
        plan_queries::list_lesson_plans(pool, owner_id, LessonPlanFilter { grade_level, limit })
            .await?;

    if page.plans.is_empty() {
        println!("No lesson plans found. Use `lessonplan generate` to create one.");
        return Ok(());
    }

    print!("{}", format_plan_table(&page.plans));
    if (page.plans.len() as i64) < page.total {
        println!();
        println!("Showing {} of {} plans.", page.plans.len(), page.total);
    }
    Ok(())
}

/// Render plans as a fixed-width table.
pub fn format_plan_table(plans: &[LessonPlan]) -> String {
    let id_w = 36;
    let grade_w = GradeLevel::ALL
        .iter()
        .map(|g| g.label().chars().count())
        .max()
        .unwrap_or(5);
    let min_w = 3;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<id_w$}  {:<grade_w$}  {:>min_w$}  {:<TOPIC_WIDTH$}  CREATED",
        "ID", "GRADE", "MIN", "TOPIC",
    );
    for plan in plans {
        let _ = writeln!(
            out,
            "{:<id_w$}  {:<grade_w$}  {:>min_w$}  {:<TOPIC_WIDTH$}  {}",
            plan.id,
            plan.grade_level.label(),
            plan.duration_minutes,
            truncate(&plan.topic, TOPIC_WIDTH),
            plan.created_at.format("%Y-%m-%d %H:%M"),
        );
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width.saturating_sub(3)).collect();
    short.push_str("...");
    short
}

// -----------------------------------------------------------------------
// lessonplan plan show <plan-id>
// -----------------------------------------------------------------------

async fn cmd_show(pool: &PgPool, owner_id: Uuid, raw_id: &str, json: bool) -> Result<()> {
    let plan_id = parse_plan_id(raw_id)?;
    let Some(plan) = plan_queries::get_lesson_plan(pool, owner_id, plan_id).await? else {
        bail!("lesson plan {plan_id} not found");
    };

    if json {
        let rendered =
            serde_json::to_string_pretty(&plan).context("failed to serialize lesson plan")?;
        println!("{rendered}");
    } else {
        print!("{}", format_plan(&plan));
    }
    Ok(())
}

/// Plan header followed by its four sections.
pub fn format_plan(plan: &LessonPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Lesson plan: {}", plan.topic);
    let _ = writeln!(out, "  ID:          {}", plan.id);
    let _ = writeln!(out, "  Grade:       {}", plan.grade_level.label());
    let _ = writeln!(out, "  Duration:    {} min", plan.duration_minutes);
    if let Some(subject) = &plan.subject {
        let _ = writeln!(out, "  Subject:     {subject}");
    }
    if let Some(code) = &plan.standards_code {
        let _ = writeln!(out, "  BNCC:        {code}");
    }
    if let Some(notes) = &plan.notes {
        let _ = writeln!(out, "  Notes:       {notes}");
    }
    let _ = writeln!(
        out,
        "  Model:       {} ({} tokens, {} ms)",
        plan.model, plan.total_tokens, plan.generation_ms
    );
    let _ = writeln!(
        out,
        "  Created:     {}",
        plan.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    out.push('\n');
    out.push_str(&format_sections(&LessonPlanSections::from(plan)));
    out
}

/// The four sections under their canonical headers.
pub fn format_sections(sections: &LessonPlanSections) -> String {
    let mut out = String::new();
    for (i, (key, body)) in sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "== {} ==", key.header());
        let _ = writeln!(out, "{body}");
    }
    out
}

// -----------------------------------------------------------------------
// lessonplan plan delete <plan-id>
// -----------------------------------------------------------------------

async fn cmd_delete(pool: &PgPool, owner_id: Uuid, raw_id: &str) -> Result<()> {
    let plan_id = parse_plan_id(raw_id)?;
    if !plan_queries::delete_lesson_plan(pool, owner_id, plan_id).await? {
        bail!("lesson plan {plan_id} not found");
    }
    println!("Lesson plan {plan_id} deleted.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use lessonplan_core::sections::PLACEHOLDER;
    use lessonplan_db::queries::lesson_plans::NewLessonPlan;
    use lessonplan_test_utils::{create_test_db, drop_test_db};

    use super::*;

    fn sample_plan(topic: &str) -> LessonPlan {
        LessonPlan {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            topic: topic.to_string(),
            subject: None,
            grade_level: GradeLevel::HighSchool,
            duration_minutes: 90,
            standards_code: Some("EM13MA01".to_string()),
            notes: None,
            introduction: "Olá".to_string(),
            objective: "Aprender".to_string(),
            steps: "1. Fazer".to_string(),
            rubric: PLACEHOLDER.to_string(),
            model: "gemini-test".to_string(),
            total_tokens: 100,
            generation_ms: 2500,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn plan_table_has_header_and_rows() {
        let plans = vec![sample_plan("Funções"), sample_plan("Geometria")];
        let table = format_plan_table(&plans);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].contains("Ensino Médio"));
        assert!(lines[1].contains("Funções"));
        assert!(lines[2].contains(&plans[1].id.to_string()));
    }

    #[test]
    fn long_topics_are_truncated() {
        let topic = "a".repeat(60);
        assert_eq!(truncate(&topic, 10), "aaaaaaa...");
        assert_eq!(truncate("Frações", 10), "Frações");
    }

    #[test]
    fn plan_rendering_lists_sections_in_order() {
        let rendered = format_plan(&sample_plan("Funções"));

        assert!(rendered.contains("BNCC:        EM13MA01"));
        let intro = rendered.find("== INTRODUÇÃO LÚDICA ==").unwrap();
        let objective = rendered.find("== OBJETIVO DE APRENDIZAGEM ==").unwrap();
        let steps = rendered.find("== PASSO A PASSO DA ATIVIDADE ==").unwrap();
        let rubric = rendered.find("== RUBRICA DE AVALIAÇÃO ==").unwrap();
        assert!(intro < objective && objective < steps && steps < rubric);
        assert!(rendered.trim_end().ends_with(PLACEHOLDER));
    }

    #[test]
    fn plan_id_must_be_uuid() {
        let err = parse_plan_id("42").unwrap_err();
        assert!(err.to_string().contains("invalid plan ID"));
        assert!(parse_plan_id(&format!(" {} ", Uuid::nil())).is_ok());
    }

    #[tokio::test]
    async fn delete_reports_missing_and_foreign_plans() {
        let (pool, db_name) = create_test_db().await;
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let plan = plan_queries::insert_lesson_plan(
            &pool,
            &NewLessonPlan {
                owner_id: owner,
                topic: "Frações",
                subject: None,
                grade_level: GradeLevel::ElementaryEarly,
                duration_minutes: 45,
                standards_code: None,
                notes: None,
                introduction: "a",
                objective: "b",
                steps: "c",
                rubric: "d",
                model: "m",
                total_tokens: 1,
                generation_ms: 1,
            },
        )
        .await
        .unwrap();
        let id = plan.id.to_string();

        let err = cmd_delete(&pool, stranger, &id).await.unwrap_err();
        assert!(err.to_string().contains("not found"), "{err}");

        cmd_delete(&pool, owner, &id).await.unwrap();
        let err = cmd_delete(&pool, owner, &id).await.unwrap_err();
        assert!(err.to_string().contains("not found"), "{err}");

        pool.close().await;
        drop_test_db(&db_name).await;
    }
}
