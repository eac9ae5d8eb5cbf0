// Filter matching over normalized listings
pub mod category;
pub mod facets;
pub mod matcher;

pub use facets::{FacetCount, Facets, facets};
pub use matcher::value_matches;

use crate::config::MatchingConfig;
use crate::model::Listing;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Brand,
    Model,
    Processor,
    Ram,
    Storage,
    Graphics,
    ScreenSize,
    OperatingSystem,
    Condition,
}

impl FilterField {
    pub const ALL: [FilterField; 9] = [
        FilterField::Brand,
        FilterField::Model,
        FilterField::Processor,
        FilterField::Ram,
        FilterField::Storage,
        FilterField::Graphics,
        FilterField::ScreenSize,
        FilterField::OperatingSystem,
        FilterField::Condition,
    ];

    /// The listing's canonical label for this field.
    pub fn stored<'a>(&self, listing: &'a Listing) -> Option<&'a str> {
        let specs = &listing.specs;
        match self {
            FilterField::Brand => specs.brand_label(),
            FilterField::Model => specs.model_label(),
            FilterField::Processor => specs.processor_label(),
            FilterField::Ram => specs.ram_label(),
            FilterField::Storage => specs.storage_label(),
            FilterField::Graphics => specs.graphics_label(),
            FilterField::ScreenSize => specs.screen_label(),
            FilterField::OperatingSystem => specs.operating_system.as_deref(),
            FilterField::Condition => specs.condition.map(|c| c.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Catalog order.
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    RatingDesc,
    Newest,
}

/// A query over the catalog: selected values per field plus numeric bounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingFilter {
    pub selections: BTreeMap<FilterField, Vec<String>>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    pub query: Option<String>,
    pub sort: SortOrder,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl ListingFilter {
    pub fn select(mut self, field: FilterField, value: impl Into<String>) -> Self {
        self.selections.entry(field).or_default().push(value.into());
        self
    }
}

/// Values inside a field are OR-ed, fields are AND-ed.
pub fn listing_matches(listing: &Listing, filter: &ListingFilter, matching: &MatchingConfig) -> bool {
    let fields_ok = filter.selections.iter().all(|(field, values)| {
        values.is_empty()
            || values
                .iter()
                .any(|v| value_matches(*field, field.stored(listing), v, matching.token_overlap))
    });
    if !fields_ok {
        return false;
    }

    if filter.min_price.is_some() || filter.max_price.is_some() {
        let Some(price) = listing.price else {
            return false;
        };
        if filter.min_price.is_some_and(|min| price < min) || filter.max_price.is_some_and(|max| price > max) {
            return false;
        }
    }
    if let Some(min_rating) = filter.min_rating {
        if listing.rating.is_none_or(|r| r < min_rating) {
            return false;
        }
    }
    match filter.query.as_deref().map(str::trim) {
        Some(query) if !query.is_empty() => {
            let title = listing.title.to_lowercase();
            query
                .to_lowercase()
                .split_whitespace()
                .all(|token| title.contains(token))
        }
        _ => true,
    }
}

fn by_price(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.total_cmp(&a),
        (Some(a), Some(b)) => a.total_cmp(&b),
        // Unpriced listings sort last either way.
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Matches, sorts and paginates.
pub fn apply<'a>(listings: &'a [Listing], filter: &ListingFilter, matching: &MatchingConfig) -> Vec<&'a Listing> {
    let mut matched: Vec<&Listing> = listings
        .iter()
        .filter(|l| listing_matches(l, filter, matching))
        .collect();

    match filter.sort {
        SortOrder::Relevance => {}
        SortOrder::PriceAsc => matched.sort_by(|a, b| by_price(a.price, b.price, false)),
        SortOrder::PriceDesc => matched.sort_by(|a, b| by_price(a.price, b.price, true)),
        SortOrder::RatingDesc => {
            matched.sort_by(|a, b| b.rating.unwrap_or(0.0).total_cmp(&a.rating.unwrap_or(0.0)))
        }
        SortOrder::Newest => matched.sort_by(|a, b| b.first_seen.cmp(&a.first_seen)),
    }

    let page = matched.into_iter().skip(filter.offset);
    match filter.limit {
        Some(limit) => page.take(limit).collect(),
        None => page.collect(),
    }
}
