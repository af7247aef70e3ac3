mod config;
mod plan_cmds;
mod serve_cmd;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use taskplan_core::planner::{GeminiClient, TextGenerator};
use taskplan_db::pool;

use config::TaskplanConfig;

#[derive(Parser)]
#[command(name = "taskplan", about = "Turn a goal into a persisted task plan via a generative language model")]
struct Cli {
    /// Database URL (overrides TASKPLAN_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a taskplan config file (no database required)
    Init {
        /// Gemini API key to store in the config file
        #[arg(long)]
        api_key: Option<String>,
        /// Database URL to store in the config file
        #[arg(long)]
        db_url: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create the database file and run migrations
    DbInit,
    /// Plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Serve the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a plan from a goal by calling the provider
    New {
        /// The goal to decompose into tasks
        goal: String,
    },
    /// Show plan details (or list all plans)
    Show {
        /// Plan ID to show (omit to list all)
        plan_id: Option<String>,
    },
    /// Delete a plan and its tasks
    Delete {
        /// Plan ID to delete
        plan_id: String,
    },
}

/// Execute the `taskplan init` command: write config file.
fn cmd_init(api_key: Option<&str>, db_url: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let db_url = db_url
        .map(str::to_string)
        .unwrap_or_else(taskplan_db::config::DbConfig::default_url);

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.clone(),
        },
        gemini: config::GeminiSection {
            api_key: api_key.unwrap_or_default().to_string(),
            model: None,
            base_url: None,
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    if api_key.is_none() {
        println!();
        println!("No API key stored. Set GEMINI_API_KEY or edit the config file.");
    }
    println!();
    println!("Next: run `taskplan db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `taskplan db-init` command: create the store and migrate.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let db_config = TaskplanConfig::resolve_db(cli_db_url);

    println!("Initializing taskplan database...");

    let db_pool = pool::create_pool(&db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("taskplan db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            api_key,
            db_url,
            force,
        } => {
            cmd_init(api_key.as_deref(), db_url.as_deref(), force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Plan { command } => {
            let needs_provider = matches!(command, PlanCommands::New { .. });
            if needs_provider {
                let resolved = TaskplanConfig::resolve(cli.database_url.as_deref())?;
                let db_pool = pool::create_pool(&resolved.db_config).await?;
                let provider = GeminiClient::new(resolved.gemini)?;
                let result = plan_cmds::run_plan_command(
                    command,
                    &db_pool,
                    Some(&provider as &dyn TextGenerator),
                )
                .await;
                db_pool.close().await;
                result?;
            } else {
                let db_config = TaskplanConfig::resolve_db(cli.database_url.as_deref());
                let db_pool = pool::create_pool(&db_config).await?;
                let result = plan_cmds::run_plan_command(command, &db_pool, None).await;
                db_pool.close().await;
                result?;
            }
        }
        Commands::Serve { bind, port } => {
            let resolved = TaskplanConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            pool::run_migrations(&db_pool).await?;
            let provider = Arc::new(GeminiClient::new(resolved.gemini)?);
            let result = serve_cmd::run_serve(db_pool.clone(), provider, &bind, port).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
