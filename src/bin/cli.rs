//! promptcrawl CLI
//!
//! Local execution entry point for the discovery-and-extraction pipeline.

use std::collections::HashSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use promptcrawl::{
    config::Credentials,
    error::Result,
    models::Config,
    pipeline,
    services::{ExtractionClient, SearchClient},
    storage::{CsvStore, PromptStore},
};

/// promptcrawl - Topical Prompt Discovery & Extraction
#[derive(Parser, Debug)]
#[command(
    name = "promptcrawl",
    version,
    about = "Discovers pages for topical queries and extracts prompts into a CSV store"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline: discover, extract, dedup, persist
    Run {
        /// Override the store path from the config
        #[arg(long)]
        store: Option<PathBuf>,

        /// Override the per-query result limit
        #[arg(long)]
        limit: Option<usize>,

        /// Override the configured query set (repeatable)
        #[arg(long = "query")]
        queries: Vec<String>,
    },

    /// Validate configuration and credentials
    Validate,

    /// Show current store statistics
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Pick up a local .env before credentials are read.
    dotenvy::dotenv().ok();

    let mut config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Run {
            store,
            limit,
            queries,
        } => {
            if let Some(store) = store {
                config.run.store_path = store.display().to_string();
            }
            if let Some(limit) = limit {
                config.run.max_results = limit;
            }
            if !queries.is_empty() {
                config.run.queries = queries;
            }
            config.validate()?;

            let credentials = Credentials::from_env()?;
            let search = SearchClient::new(
                &config.search,
                &config.run.user_agent,
                credentials.search_api_key.clone(),
            )?;
            let extraction = ExtractionClient::new(
                &config.extraction,
                &config.run.user_agent,
                credentials.extraction_api_key.clone(),
            )?;
            let store = CsvStore::new(&config.run.store_path);

            log::info!(
                "Starting run: {} queries, limit {}, concurrency {}, store {}",
                config.run.queries.len(),
                config.run.max_results,
                config.run.concurrency,
                config.run.store_path
            );

            let stats = pipeline::run_pipeline(&config, &search, &extraction, &store).await?;

            log::info!(
                "Done in {}s",
                (stats.finished_at - stats.started_at).num_seconds()
            );
        }

        Command::Validate => {
            config.validate()?;
            Credentials::from_env()?;
            log::info!(
                "Config OK: {} queries, store at {}",
                config.run.queries.len(),
                config.run.store_path
            );
        }

        Command::Info => {
            let store = CsvStore::new(&config.run.store_path);
            let rows = store.load_all().await?;
            // Visit-marker rows record visited URLs, not prompts.
            let prompts = rows.iter().filter(|r| !r.is_visit_marker()).count();
            let urls: HashSet<&str> = rows.iter().map(|r| r.source_url.as_str()).collect();

            log::info!("Store: {}", config.run.store_path);
            log::info!("Prompts: {prompts}");
            log::info!("Visited source URLs: {}", urls.len());
        }
    }

    Ok(())
}
