// Core structs: RawListing, Listing, LaptopSpecs, error types
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A listing as it arrives from a feed, before any normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawListing {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub bullet_points: Vec<String>,
    pub details: BTreeMap<String, String>,
    pub manufacturer: Option<String>,
    pub price: Option<f64>,
    pub list_price: Option<f64>,
    pub currency: Option<String>,
    pub rating: Option<f64>,
    pub reviews_count: Option<u32>,
    pub url: Option<String>,
}

/// Where an extracted attribute came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecSource {
    Title,
    Details,
    Description,
    Inferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GpuKind {
    Dedicated,
    Integrated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    New,
    Renewed,
    Used,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "New",
            Condition::Renewed => "Renewed",
            Condition::Used => "Used",
        }
    }
}

/// A single extracted attribute: canonical label plus provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecValue {
    pub label: String,
    pub source: SpecSource,
}

impl SpecValue {
    pub fn new(label: impl Into<String>, source: SpecSource) -> Self {
        Self {
            label: label.into(),
            source,
        }
    }
}

/// Normalized laptop specification extracted from a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaptopSpecs {
    pub brand: Option<SpecValue>,
    pub model: Option<SpecValue>,
    pub processor: Option<SpecValue>,
    pub ram: Option<SpecValue>,
    pub ram_type: Option<String>,
    pub storage: Option<SpecValue>,
    pub graphics: Option<SpecValue>,
    pub gpu_kind: Option<GpuKind>,
    pub screen_size: Option<SpecValue>,
    pub resolution: Option<String>,
    pub refresh_rate_hz: Option<u32>,
    pub touchscreen: bool,
    pub operating_system: Option<String>,
    pub condition: Option<Condition>,
}

impl LaptopSpecs {
    pub fn brand_label(&self) -> Option<&str> {
        self.brand.as_ref().map(|v| v.label.as_str())
    }

    pub fn model_label(&self) -> Option<&str> {
        self.model.as_ref().map(|v| v.label.as_str())
    }

    pub fn processor_label(&self) -> Option<&str> {
        self.processor.as_ref().map(|v| v.label.as_str())
    }

    pub fn ram_label(&self) -> Option<&str> {
        self.ram.as_ref().map(|v| v.label.as_str())
    }

    pub fn storage_label(&self) -> Option<&str> {
        self.storage.as_ref().map(|v| v.label.as_str())
    }

    pub fn graphics_label(&self) -> Option<&str> {
        self.graphics.as_ref().map(|v| v.label.as_str())
    }

    pub fn screen_label(&self) -> Option<&str> {
        self.screen_size.as_ref().map(|v| v.label.as_str())
    }
}

/// A normalized, catalog-ready listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub feed: String,
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub list_price: Option<f64>,
    pub currency: Option<String>,
    pub rating: Option<f64>,
    pub reviews_count: Option<u32>,
    pub url: Option<String>,
    pub specs: LaptopSpecs,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// Price statistics over a group of listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub group: String,
    pub count: usize,
    pub avg_price: f64,
    pub std_dev: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub listing_id: String,
    pub price: f64,
    pub seen_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    InvalidResponse { status: u16, url: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("feed has neither a path nor a url")]
    MissingLocation,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported feed shape: {0}")]
    UnsupportedShape(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("invalid stored specs: {0}")]
    Specs(#[from] serde_json::Error),
}
