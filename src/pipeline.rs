use crate::analyzer::{Analyzer, AnalyzerImpl, Deal};
use crate::catalog::{CatalogStorage, SaveOutcome};
use crate::config::{AppConfig, FeedConfig};
use crate::model::{ParseError, SourceError, StorageError};
use crate::normalizer::normalize_all;
use crate::parser::{FeedParser, Parser};
use crate::source::{ListingSource, source_for};
use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Outcome of one pass over a feed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedReport {
    pub feed: String,
    pub parsed: usize,
    pub stored: usize,
    pub inserted: usize,
    pub price_changes: usize,
    pub removed: usize,
    pub deals: Vec<Deal>,
}

/// Fetches, parses, normalizes and stores one feed, then refreshes group
/// statistics and reports the feed's deals.
pub async fn process_feed(
    feed: &FeedConfig,
    source: &dyn ListingSource,
    parser: &FeedParser,
    analyzer: &AnalyzerImpl,
    storage: Arc<Mutex<CatalogStorage>>,
    config: &AppConfig,
) -> Result<FeedReport, PipelineError> {
    info!("Processing feed: {} ({})", feed.name, source.location());
    let mut report = FeedReport {
        feed: feed.name.clone(),
        ..Default::default()
    };

    info!("Fetching feed...");
    let body = source.fetch().await?;

    info!("Parsing feed...");
    let raw = match parser.parse(&body) {
        Ok(raw) => raw,
        Err(e) => {
            if let Some(dir) = &config.debug_dump_dir {
                log_and_save_body(&body, &feed.name, Path::new(dir));
            }
            return Err(e.into());
        }
    };
    report.parsed = raw.len();

    let listings = normalize_all(&raw, &feed.name, Utc::now());
    info!("Normalized {} of {} records", listings.len(), raw.len());

    let mut seen_ids = Vec::with_capacity(listings.len());
    {
        let storage = storage.lock().await;
        for listing in &listings {
            seen_ids.push(listing.id.clone());
            match storage.save_listing(listing) {
                Ok(outcome) => {
                    report.stored += 1;
                    match outcome {
                        SaveOutcome::Inserted => report.inserted += 1,
                        SaveOutcome::PriceChanged { previous } => {
                            report.price_changes += 1;
                            info!(
                                "Price change for {}: {:?} -> {:?}",
                                listing.id, previous, listing.price
                            );
                        }
                        SaveOutcome::Unchanged => {}
                    }
                }
                Err(e) => warn!("DB save error for {}: {}", listing.id, e),
            }
        }
    }

    info!("Cleaning up old listings for feed {}...", feed.name);
    report.removed = storage
        .lock()
        .await
        .delete_missing_for_feed(&feed.name, &seen_ids)?;

    // Groups span feeds, so statistics use the whole catalog.
    let catalog = storage.lock().await.all_listings()?;
    info!("Updating stats in storage...");
    match storage.lock().await.replace_stats(&analyzer.group_stats(&catalog)) {
        Ok(0) => {}
        Ok(stale) => info!("Dropped stats for {} vanished groups", stale),
        Err(e) => warn!("Stats update failed: {}", e),
    }

    report.deals = analyzer
        .find_deals(&catalog, &config.deals)
        .into_iter()
        .filter(|deal| seen_ids.contains(&deal.listing_id))
        .collect();
    info!("Found {} deals", report.deals.len());
    for deal in &report.deals {
        info!(
            "Deal: {} at {:.2} ({:.1}% under {:.2} for {})",
            deal.listing_id, deal.price, deal.savings_pct, deal.group_avg, deal.group
        );
    }

    info!("Finished processing feed: {}", feed.name);
    Ok(report)
}

/// Processes every configured feed (or only `only`) concurrently. A failing
/// feed is logged and does not stop the others.
pub async fn run_feeds(
    config: &AppConfig,
    storage: Arc<Mutex<CatalogStorage>>,
    only: Option<&str>,
) -> Vec<FeedReport> {
    let parser = FeedParser::new();
    let analyzer = AnalyzerImpl::new();

    let feeds: Vec<&FeedConfig> = config
        .feeds
        .iter()
        .filter(|f| only.is_none_or(|name| f.name == name))
        .collect();
    if feeds.is_empty() {
        warn!("No feeds to process");
    }

    let tasks: Vec<_> = feeds
        .into_iter()
        .map(|feed| {
            let storage = storage.clone();
            let parser = &parser;
            let analyzer = &analyzer;
            async move {
                let source = match source_for(feed) {
                    Ok(source) => source,
                    Err(e) => {
                        warn!("Feed {} skipped: {}", feed.name, e);
                        return None;
                    }
                };
                match process_feed(feed, source.as_ref(), parser, analyzer, storage, config).await {
                    Ok(report) => Some(report),
                    Err(e) => {
                        warn!("Feed {} failed: {}", feed.name, e);
                        None
                    }
                }
            }
        })
        .collect();

    join_all(tasks).await.into_iter().flatten().collect()
}

/// Saves a feed body that could not be parsed, for debugging.
fn log_and_save_body(body: &str, feed: &str, folder: &Path) {
    if let Err(e) = fs::create_dir_all(folder) {
        warn!("Failed to create debug folder: {}", e);
        return;
    }
    let filename = folder.join(format!("debug-{}.json", feed.replace([' ', '/'], "_")));
    if let Err(e) = fs::write(&filename, body) {
        warn!("Failed to write debug feed: {}", e);
    } else {
        info!("Saved debug feed: {}", filename.display());
    }
}
