//! canopy CLI - serve and manage the tree/insect observation API

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(name = "canopy", version, about = "Tree/insect observation API")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),

    /// Database management (migrate, seed)
    Db(commands::db::DbArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; environment variables still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    tracing_setup::init_tracing(cli.debug)?;

    match cli.command {
        Commands::Serve(args) => commands::serve::run(args).await?,
        Commands::Db(args) => commands::db::run(args).await?,
    }

    Ok(())
}
