//! Load the bundled seed files into SurrealDB, replacing whatever is there.
//!
//! Usage:
//!   cargo run --bin seed
//!   cargo run --bin seed -- --dir ./data
//!   cargo run --bin seed -- --dry-run

use anyhow::{Context, Result};
use career_compass::config::Config;
use career_compass::seed::SeedData;
use career_compass::store::{CatalogStore, SurrealStore};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "seed")]
#[command(about = "Seed the career catalog database", long_about = None)]
struct Cli {
    /// Directory holding careers.json, questions.json, roadmaps.json and colleges.json
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Validate the seed files without touching the database
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(config.runtime.log_level.as_str())
        .init();

    let dir = cli
        .dir
        .or_else(|| config.runtime.seed_dir.clone())
        .unwrap_or_else(|| PathBuf::from("data"));
    let seed = SeedData::load_dir(&dir)
        .with_context(|| format!("Failed to load seed data from {}", dir.display()))?;

    if cli.dry_run {
        println!(
            "Seed data OK: {} careers, {} questions, {} roadmaps, {} colleges/exams",
            seed.careers.len(),
            seed.questions.len(),
            seed.roadmaps.len(),
            seed.entries.len()
        );
        return Ok(());
    }

    let store = SurrealStore::connect(&config)
        .await
        .with_context(|| format!("Failed to connect to SurrealDB at {}", config.database.url))?;
    store.replace_all(seed).await?;
    info!("Database seeded successfully");
    Ok(())
}
