use clap::{Args, Parser, Subcommand};
use laptop_sniper::analyzer::lifecycle::price_drops;
use laptop_sniper::analyzer::{Analyzer, AnalyzerImpl};
use laptop_sniper::catalog::CatalogStorage;
use laptop_sniper::config::{AppConfig, ConfigError, load_config};
use laptop_sniper::extract::{ExtractInput, extract_specs};
use laptop_sniper::filter::{self, FilterField, ListingFilter, SortOrder};
use laptop_sniper::logging;
use laptop_sniper::model::StorageError;
use laptop_sniper::pipeline::run_feeds;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "laptop-sniper")]
#[command(about = "Normalizes laptop listings into a searchable catalog")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Catalog database path (overrides the config)
    #[arg(long)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and store every configured feed once
    Ingest {
        /// Only process the feed with this name
        #[arg(long)]
        feed: Option<String>,
    },
    /// Re-ingest all feeds on the configured interval until Ctrl-C
    Watch,
    /// Filter the catalog
    Search(SearchArgs),
    /// Filter values available in the catalog, with counts
    Facets,
    /// Listings priced well under comparable ones
    Deals,
    /// Listings whose price just went down
    Drops,
    /// Price statistics per comparable group
    Stats,
    /// Show the specs extracted from a title
    Inspect {
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Args)]
struct SearchArgs {
    #[arg(long)]
    brand: Vec<String>,
    #[arg(long)]
    model: Vec<String>,
    #[arg(long)]
    processor: Vec<String>,
    #[arg(long)]
    ram: Vec<String>,
    #[arg(long)]
    storage: Vec<String>,
    #[arg(long)]
    graphics: Vec<String>,
    #[arg(long)]
    screen: Vec<String>,
    #[arg(long)]
    os: Vec<String>,
    #[arg(long)]
    condition: Vec<String>,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    #[arg(long)]
    min_rating: Option<f64>,
    /// Words that must all appear in the title
    #[arg(long)]
    query: Option<String>,
    #[arg(long, value_enum, default_value_t = SortOrder::Relevance)]
    sort: SortOrder,
    #[arg(long)]
    limit: Option<usize>,
    #[arg(long, default_value_t = 0)]
    offset: usize,
}

impl SearchArgs {
    fn into_filter(self) -> ListingFilter {
        let selections: BTreeMap<FilterField, Vec<String>> = [
            (FilterField::Brand, self.brand),
            (FilterField::Model, self.model),
            (FilterField::Processor, self.processor),
            (FilterField::Ram, self.ram),
            (FilterField::Storage, self.storage),
            (FilterField::Graphics, self.graphics),
            (FilterField::ScreenSize, self.screen),
            (FilterField::OperatingSystem, self.os),
            (FilterField::Condition, self.condition),
        ]
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .collect();

        ListingFilter {
            selections,
            min_price: self.min_price,
            max_price: self.max_price,
            min_rating: self.min_rating,
            query: self.query,
            sort: self.sort,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to write output: {0}")]
    Output(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Config load error: {}", e);
            std::process::exit(2);
        }
    };
    if let Some(database) = &cli.database {
        config.database_path = database.clone();
    }

    logging::init(&config.logging);

    if let Err(e) = run(cli.command, config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: AppConfig) -> Result<(), AppError> {
    if let Commands::Inspect { title, description } = &command {
        let details = BTreeMap::new();
        let specs = extract_specs(&ExtractInput {
            title,
            details: &details,
            bullet_points: &[],
            description: description.as_deref().unwrap_or_default(),
        });
        return print_json(&specs);
    }

    let storage = CatalogStorage::new(&config.database_path)?;
    let analyzer = AnalyzerImpl::new();

    match command {
        Commands::Ingest { feed } => {
            let storage = Arc::new(Mutex::new(storage));
            let reports = run_feeds(&config, storage, feed.as_deref()).await;
            print_json(&reports)
        }
        Commands::Watch => {
            watch(Arc::new(Mutex::new(storage)), &config).await;
            Ok(())
        }
        Commands::Search(args) => {
            let listings = storage.all_listings()?;
            let found = filter::apply(&listings, &args.into_filter(), &config.matching);
            info!("{} of {} listings match", found.len(), listings.len());
            print_json(&found)
        }
        Commands::Facets => {
            let listings = storage.all_listings()?;
            print_json(&filter::facets(&listings, config.price_band_step))
        }
        Commands::Deals => {
            let listings = storage.all_listings()?;
            print_json(&analyzer.find_deals(&listings, &config.deals))
        }
        Commands::Drops => print_json(&price_drops(&storage.price_history(None)?)),
        Commands::Stats => print_json(&storage.all_stats()?),
        Commands::Inspect { .. } => Ok(()),
    }
}

/// Main processing loop: ingest everything, then wait for the timer or Ctrl-C.
async fn watch(storage: Arc<Mutex<CatalogStorage>>, config: &AppConfig) {
    loop {
        info!("Feeds to process: {}", config.feeds.len());
        let reports = run_feeds(config, storage.clone(), None).await;
        let deals: usize = reports.iter().map(|r| r.deals.len()).sum();
        info!("Processed {} feeds, {} deals", reports.len(), deals);

        info!("Waiting for timer ({}s) or Ctrl-C...", config.check_interval_seconds);
        tokio::select! {
            _ = sleep(Duration::from_secs(config.check_interval_seconds)) => {
                info!("Timer triggered.");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down.");
                break;
            }
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
