use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use trivia_api::configuration::get_configuration;
use trivia_api::db::{establish_connection, run_migrations};
use trivia_api::server::run_server;
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file, `configuration.*` in the working directory by default
    #[clap(long)]
    config: Option<PathBuf>,
    /// Do not apply pending database migrations on start
    #[clap(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = get_configuration(cli.config.as_deref()).context("Failed to load configuration")?;
    let pool = establish_connection(&settings.database)
        .await
        .context("Cannot connect to DB")?;

    if !cli.skip_migrations {
        tracing::info!("Running db migrations...");
        run_migrations(&pool).await.context("Migrations failed")?;
    }

    run_server(&settings.application, pool).await
}
