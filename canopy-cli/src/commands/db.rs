//! Database management commands

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use canopy_server::db::{create_pool, migrations, seed};

/// Arguments for the db command
#[derive(Parser, Debug)]
pub struct DbArgs {
    /// Database URL (overrides environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: DbCommand,
}

#[derive(Subcommand, Debug)]
pub enum DbCommand {
    /// Create tables and indexes
    Migrate,

    /// Apply the starter dataset
    Seed {
        /// Remove the starter dataset instead
        #[arg(long)]
        undo: bool,
    },
}

/// Run a database management command
pub async fn run(args: DbArgs) -> Result<()> {
    let database_url = args
        .database_url
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or .env")?;

    let pool = create_pool(&database_url)
        .await
        .context("Failed to create database pool")?;

    match args.command {
        DbCommand::Migrate => {
            migrations::run(&pool).await.context("Migration failed")?;
        }
        DbCommand::Seed { undo: false } => {
            migrations::run(&pool).await.context("Migration failed")?;
            seed::run(&pool).await.context("Seed failed")?;
        }
        DbCommand::Seed { undo: true } => {
            seed::undo(&pool).await.context("Seed removal failed")?;
        }
    }

    Ok(())
}
