//! `lessonplan health`: probe the database and the completion provider.

use anyhow::Result;
use sqlx::PgPool;

use lessonplan_core::completion::CompletionProvider;
use lessonplan_core::health::{HealthReport, ServiceStatus, check_health};

/// Print the report and return whether everything is up.
pub async fn run_health(pool: &PgPool, provider: &dyn CompletionProvider, json: bool) -> Result<bool> {
    let report = check_health(pool, provider).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report));
    }
    Ok(report.is_healthy())
}

pub fn format_report(report: &HealthReport) -> String {
    let line = |name: &str, status: &ServiceStatus| match status {
        ServiceStatus::Up => format!("  {name:<10}  up\n"),
        ServiceStatus::Down { error } => format!("  {name:<10}  down ({error})\n"),
    };

    let overall = if report.is_healthy() { "healthy" } else { "unhealthy" };
    let mut out = format!("Status: {overall}\n");
    out.push_str(&line("database", &report.database));
    out.push_str(&line(&report.provider, &report.completion));
    out.push_str(&format!("  {:<10}  {}\n", "model", report.model));
    out
}
