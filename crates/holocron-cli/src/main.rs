mod import;
mod metadata;
mod stats;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::import::ImportArgs;
use crate::metadata::MetadataCommands;

#[derive(Debug, Parser)]
#[command(name = "holocron")]
#[command(about = "Star Wars Unlimited collection importer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import an inventory spreadsheet into the card catalog
    Import(ImportArgs),
    /// Inspect or refresh the external card metadata cache
    Metadata {
        #[command(subcommand)]
        command: MetadataCommands,
    },
    /// Print collection completion statistics
    Stats {
        /// Compute from an inventory file instead of the database
        #[arg(long)]
        file: Option<PathBuf>,

        /// Worksheet to read when `--file` is a workbook
        #[arg(long, requires = "file")]
        sheet: Option<String>,
    },
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("holocron: run `holocron --help` for available commands");
        return Ok(());
    };

    let config = holocron_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Import(args) => import::run_import(&config, &args).await,
        Commands::Metadata { command } => metadata::run_metadata(&config, &command).await,
        Commands::Stats { file: Some(path), sheet } => {
            stats::run_stats_from_file(&path, sheet.as_deref())
        }
        Commands::Stats { file: None, .. } => {
            let pool = connect(&config).await?;
            stats::run_stats(&pool).await
        }
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            match command {
                DbCommands::Ping => {
                    holocron_db::ping(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = holocron_db::run_migrations(&pool).await?;
                    println!("applied {applied} new migration(s)");
                }
            }
            Ok(())
        }
    }
}

/// Opens the pool with the configured limits.
pub(crate) async fn connect(config: &holocron_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool = holocron_db::connect_pool(
        &config.database_url,
        holocron_db::PoolConfig::from_app_config(config),
    )
    .await?;
    Ok(pool)
}
