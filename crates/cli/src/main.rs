mod commands;
mod logging;
mod options;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::*;
use logging::{init_logging, LogFormat, LoggingConfig};
use options::{ConnectionArgs, MigrationArgs};
use tidemark_core::{MigrationRepository, MigrationRunner, PgDatabase};

#[derive(Parser)]
#[command(name = "tidemark", version)]
#[command(about = "Simplest directory-based SQL migration tool for PostgreSQL")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(flatten)]
    migration: MigrationArgs,

    /// Logging level (e.g. DEBUG or INFO)
    #[arg(long, global = true, default_value = "info")]
    log: String,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints migration status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Migrate database
    Migrate {
        /// Only consider the first N migrations
        #[arg(long)]
        id: Option<usize>,
    },

    /// Rollback database
    Rollback {
        /// Only revert migrations from this position onwards
        #[arg(long)]
        id: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // help and version go to stdout and count as success
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let logging = LoggingConfig::from_options(&cli.log, cli.log_format);
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", error_report(&e));
            ExitCode::FAILURE
        }
    }
}

/// Single line with every cause in the chain, outermost first
fn error_report(error: &anyhow::Error) -> String {
    format!("{:#}", error)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let migration_config = cli.migration.into_config()?;
    let connection = cli.connection.into_config(|key| std::env::var(key).ok())?;
    let options = connection.connect_options()?;
    let repository = MigrationRepository::from_config(&migration_config)?;

    let database = PgDatabase::connect(options, &migration_config.migrations_table).await?;
    let runner = MigrationRunner::new(repository, database);

    let result = match cli.command {
        Commands::Status { json } => migrate::status(&runner, json).await,
        Commands::Migrate { id } => migrate::run(&runner, id).await,
        Commands::Rollback { id } => migrate::rollback(&runner, id).await,
    };

    runner.database().close().await;
    result
}
