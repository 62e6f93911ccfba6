mod config;
mod generate_cmd;
mod health_cmd;
mod history_cmd;
mod plan_cmds;
#[cfg(test)]
mod test_util;

use clap::{Parser, Subcommand};
use tracing::debug;
use uuid::Uuid;

use lessonplan_core::completion::GeminiProvider;
use lessonplan_db::config::DbConfig;
use lessonplan_db::pool;

use config::AppConfig;
use generate_cmd::GenerateArgs;

#[derive(Parser)]
#[command(name = "lessonplan", about = "Generate structured lesson plans with a hosted language model")]
struct Cli {
    /// Database URL (overrides LESSONPLAN_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Owner id for stored plans (overrides LESSONPLAN_OWNER_ID env var)
    #[arg(long, global = true)]
    owner: Option<Uuid>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a lessonplan config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = DbConfig::DEFAULT_URL)]
        db_url: String,
        /// Gemini API key to store in the config file
        #[arg(long)]
        gemini_api_key: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create the database if needed and apply migrations
    DbInit,
    /// Generate a lesson plan and store it
    Generate(GenerateArgs),
    /// Stored lesson plans
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Generation attempts, successful or not
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Check the database and the completion provider
    Health {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// List plans, newest first
    List {
        /// Only plans for this grade level
        #[arg(long)]
        grade_level: Option<String>,
        /// Maximum number of plans to show
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
        limit: Option<i64>,
    },
    /// Show one plan with its sections
    Show {
        /// Plan ID
        plan_id: String,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a plan
    Delete {
        /// Plan ID
        plan_id: String,
    },
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List recent generation attempts
    List {
        /// Maximum number of entries (default 20)
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
        limit: Option<i64>,
    },
    /// Delete all history entries
    Clear,
}

/// Execute the `lessonplan init` command: write config file.
fn cmd_init(db_url: &str, gemini_api_key: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let owner_id = Uuid::new_v4();
    let has_key = gemini_api_key.is_some();
    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        gemini: config::GeminiSection {
            api_key: gemini_api_key,
            model: None,
        },
        owner: config::OwnerSection { id: owner_id },
    };

    let path = config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  owner.id = {owner_id}");
    if has_key {
        println!("  gemini.api_key = (set)");
    } else {
        println!("  gemini.api_key not set; export {} before generating.", config::API_KEY_ENV);
    }
    println!();
    println!("Next: run `lessonplan db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `lessonplan db-init` command: create database and run migrations.
async fn cmd_db_init(resolved: &AppConfig) -> anyhow::Result<()> {
    println!("Initializing lessonplan database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("lessonplan db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let resolve = || AppConfig::resolve(cli.database_url.as_deref(), cli.owner);

    match cli.command {
        Commands::Init {
            db_url,
            gemini_api_key,
            force,
        } => {
            cmd_init(&db_url, gemini_api_key, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(&resolve()?).await?;
        }
        Commands::Generate(args) => {
            let request = generate_cmd::validate(&args)?;
            let resolved = resolve()?;
            let owner_id = resolved.require_owner()?;
            let provider = GeminiProvider::new(resolved.gemini_config()?)?;
            debug!(owner = %owner_id, model = %resolved.gemini_model, "resolved configuration");
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result =
                generate_cmd::run_generate(&db_pool, &provider, owner_id, &request, args.json)
                    .await;
            db_pool.close().await;
            result?;
        }
        Commands::Plan { command } => {
            let resolved = resolve()?;
            let owner_id = resolved.require_owner()?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = plan_cmds::run_plan_command(command, &db_pool, owner_id).await;
            db_pool.close().await;
            result?;
        }
        Commands::History { command } => {
            let resolved = resolve()?;
            let owner_id = resolved.require_owner()?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = history_cmd::run_history_command(command, &db_pool, owner_id).await;
            db_pool.close().await;
            result?;
        }
        Commands::Health { json } => {
            let resolved = resolve()?;
            let provider = GeminiProvider::new(resolved.gemini_config()?)?;
            let db_pool = pool::create_lazy_pool(&resolved.db_config)?;
            let result = health_cmd::run_health(&db_pool, &provider, json).await;
            db_pool.close().await;
            if !result? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
