//! CLI handlers for `lessonplan history` subcommands.

use std::fmt::Write as _;

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use lessonplan_db::models::GenerationRecord;
use lessonplan_db::queries::generation_history;

use crate::HistoryCommands;

pub async fn run_history_command(
    command: HistoryCommands,
    pool: &PgPool,
    owner_id: Uuid,
) -> Result<()> {
    match command {
        HistoryCommands::List { limit } => {
            let page = generation_history::list_generation_history(pool, owner_id, limit).await?;
            if page.records.is_empty() {
                println!("No generation history.");
                return Ok(());
            }
            print!("{}", format_history_table(&page.records));
            println!();
            println!("Showing {} of {} attempts.", page.records.len(), page.total);
        }
        HistoryCommands::Clear => {
            let removed = generation_history::clear_generation_history(pool, owner_id).await?;
            println!("Removed {removed} history entries.");
        }
    }
    Ok(())
}

/// One line per attempt. Failed attempts show their error instead of a plan id.
pub fn format_history_table(records: &[GenerationRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16}  {:<7}  {:>7}  {:<36}  TOPIC",
        "CREATED", "STATUS", "MS", "PLAN / ERROR",
    );
    for record in records {
        let topic = record
            .request
            .get("topic")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("-");
        let outcome = match (&record.lesson_plan_id, &record.error_message) {
            (Some(id), _) => id.to_string(),
            (None, Some(message)) => first_line(message, 36),
            (None, None) => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "{:<16}  {:<7}  {:>7}  {:<36}  {}",
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.status,
            record.elapsed_ms,
            outcome,
            topic,
        );
    }
    out
}

fn first_line(text: &str, width: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= width {
        line.to_string()
    } else {
        let mut short: String = line.chars().take(width.saturating_sub(3)).collect();
        short.push_str("...");
        short
    }
}
