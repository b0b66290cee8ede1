use clap::{Parser, Subcommand};
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

/// Standalone migration runner for the evtrack database schema.
#[derive(Parser)]
#[command(name = "migration", about = "Run evtrack database migrations")]
struct Cli {
    /// Database URL (falls back to DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply all pending migrations
    Up,
    /// Roll back the most recent migration
    Down,
    /// Drop everything and re-apply all migrations
    Fresh,
    /// Show migration status
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let database_url = cli
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite://evtrack.db?mode=rwc".to_string());

    let mut opts = ConnectOptions::new(database_url.clone());
    opts.connect_timeout(Duration::from_secs(30))
        .sqlx_logging(false);

    info!("Connecting to {}", database_url);
    let db = Database::connect(opts).await?;

    match cli.command {
        Command::Up => {
            migrations::Migrator::up(&db, None).await?;
            info!("Migrations applied");
        }
        Command::Down => {
            migrations::Migrator::down(&db, Some(1)).await?;
            info!("Rolled back one migration");
        }
        Command::Fresh => {
            migrations::Migrator::fresh(&db).await?;
            info!("Database recreated from scratch");
        }
        Command::Status => {
            migrations::Migrator::status(&db).await?;
        }
    }

    Ok(())
}
