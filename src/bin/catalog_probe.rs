//! Query a running catalog API through the resilient client.
//!
//! Retries and cold-start notices are printed as they happen.
//!
//! Usage:
//!   cargo run --bin catalog-probe -- careers --page 1 --limit 9 --search engineer
//!   cargo run --bin catalog-probe -- career 3
//!   cargo run --bin catalog-probe -- colleges --kind Exam
//!   cargo run --bin catalog-probe -- questions
//!   cargo run --bin catalog-probe -- roadmaps
//!   cargo run --bin catalog-probe -- chat "how do I become a pilot"

use anyhow::Result;
use career_compass::clients::{ApiClient, ServerStatus};
use career_compass::config::Config;
use career_compass::query::ListParams;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "catalog-probe")]
#[command(about = "Career catalog API client", long_about = None)]
struct Cli {
    /// Base url of the API, e.g. http://127.0.0.1:5000/api
    #[arg(long)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    page: Option<u64>,
    #[arg(long)]
    limit: Option<u64>,
    #[arg(long)]
    search: Option<String>,
    /// RIASEC code for careers, Exam or College for colleges
    #[arg(long)]
    kind: Option<String>,
}

impl ListArgs {
    fn params(&self) -> ListParams {
        let mut params = ListParams::default();
        if let Some(page) = self.page {
            params = params.with_page(page);
        }
        if let Some(limit) = self.limit {
            params = params.with_limit(limit);
        }
        if let Some(search) = &self.search {
            params = params.with_search(search.clone());
        }
        if let Some(kind) = &self.kind {
            params = params.with_kind(kind.clone());
        }
        params
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List careers
    Careers(ListArgs),
    /// Show one career
    Career { id: i64 },
    /// List colleges and exams
    Colleges(ListArgs),
    /// List assessment questions
    Questions,
    /// List roadmaps
    Roadmaps,
    /// Ask the career mentor
    Chat { message: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(base_url) = cli.base_url {
        config.client.base_url = base_url;
    }

    tracing_subscriber::fmt()
        .with_env_filter(config.runtime.log_level.as_str())
        .init();

    let api = ApiClient::new(&config.client)?;

    let mut status = api.signals().subscribe();
    let banner = tokio::spawn(async move {
        while let Ok(s) = status.recv().await {
            match s {
                ServerStatus::WakingUp => eprintln!("Server is waking up, please wait..."),
                ServerStatus::Ready => eprintln!("Server is ready."),
            }
        }
    });

    let outcome = match &cli.command {
        Commands::Careers(args) => api.careers(&args.params()).await.map(|p| print_json(&p)),
        Commands::Career { id } => api.career(*id).await.map(|c| match c {
            Some(career) => print_json(&career),
            None => {
                println!("Career not found");
                Ok(())
            }
        }),
        Commands::Colleges(args) => api.colleges(&args.params()).await.map(|p| print_json(&p)),
        Commands::Questions => api.questions().await.map(|q| print_json(&q)),
        Commands::Roadmaps => api.roadmaps().await.map(|r| print_json(&r)),
        Commands::Chat { message } => api.chat(message).await.map(|reply| {
            println!("{}", reply);
            Ok(())
        }),
    };

    banner.abort();
    match outcome {
        Ok(printed) => printed,
        Err(e) => {
            eprintln!("{}", e.user_message());
            Err(e.into())
        }
    }
}
