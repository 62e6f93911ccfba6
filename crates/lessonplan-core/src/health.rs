//! Readiness probe for the database and the completion provider.

use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, warn};

use lessonplan_db::pool;

use crate::completion::CompletionProvider;

/// Outcome of probing one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServiceStatus {
    Up,
    Down { error: String },
}

impl ServiceStatus {
    pub fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub database: ServiceStatus,
    pub completion: ServiceStatus,
    pub provider: String,
    pub model: String,
}

impl HealthReport {
    /// Healthy only when every dependency answered.
    pub fn is_healthy(&self) -> bool {
        self.database.is_up() && self.completion.is_up()
    }
}

/// Probe the database and the provider concurrently.
pub async fn check_health(db: &PgPool, provider: &dyn CompletionProvider) -> HealthReport {
    let (database, completion) = tokio::join!(pool::ping(db), provider.ping());

    let database = match database {
        Ok(()) => ServiceStatus::Up,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "database health check failed");
            ServiceStatus::Down {
                error: format!("{err:#}"),
            }
        }
    };
    let completion = match completion {
        Ok(()) => ServiceStatus::Up,
        Err(err) => {
            warn!(provider = provider.name(), error = %err, "provider health check failed");
            ServiceStatus::Down {
                error: err.to_string(),
            }
        }
    };

    let report = HealthReport {
        database,
        completion,
        provider: provider.name().to_owned(),
        model: provider.model().to_owned(),
    };
    debug!(healthy = report.is_healthy(), "health check finished");
    report
}
