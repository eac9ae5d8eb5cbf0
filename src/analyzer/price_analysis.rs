use crate::config::DealConfig;
use crate::extract::{processor, storage};
use crate::model::{GroupStats, LaptopSpecs, Listing};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;

/// Trait defining the interface for a listing analyzer.
pub trait Analyzer {
    fn calculate_stats(&self, group: &str, listings: &[&Listing]) -> Option<GroupStats>;
    fn find_deals(&self, listings: &[Listing], cfg: &DealConfig) -> Vec<Deal>;
}

/// A listing priced well below comparable listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deal {
    pub listing_id: String,
    pub title: String,
    pub price: f64,
    pub group: String,
    pub group_avg: f64,
    pub savings: f64,
    pub savings_pct: f64,
    pub url: Option<String>,
}

pub struct AnalyzerImpl;

impl AnalyzerImpl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnalyzerImpl {
    fn default() -> Self {
        Self::new()
    }
}

/// Comparable-listing group: processor family, RAM and storage size, e.g.
/// `Intel Core i7 / 16GB / 512GB`. Listings missing any of those have no group.
pub fn group_key(specs: &LaptopSpecs) -> Option<String> {
    let cpu = processor::parse(specs.processor_label()?)?;
    let ram = specs.ram_label()?;
    let drive = storage::parse_detail(specs.storage_label()?)?;
    Some(format!(
        "{} {} / {} / {}",
        cpu.vendor,
        cpu.family,
        ram,
        storage::size_label(drive.size_gb)
    ))
}

/// Priced listings bucketed by [`group_key`].
pub fn group_listings(listings: &[Listing]) -> BTreeMap<String, Vec<&Listing>> {
    let mut groups: BTreeMap<String, Vec<&Listing>> = BTreeMap::new();
    for listing in listings {
        if !listing.price.is_some_and(|p| p > 0.0) {
            continue;
        }
        if let Some(key) = group_key(&listing.specs) {
            groups.entry(key).or_default().push(listing);
        }
    }
    groups
}

impl AnalyzerImpl {
    /// Statistics for every group in the catalog.
    pub fn group_stats(&self, listings: &[Listing]) -> Vec<GroupStats> {
        group_listings(listings)
            .iter()
            .filter_map(|(group, members)| self.calculate_stats(group, members))
            .collect()
    }
}

impl Analyzer for AnalyzerImpl {
    /// Average, population standard deviation and bounds of the group's prices.
    fn calculate_stats(&self, group: &str, listings: &[&Listing]) -> Option<GroupStats> {
        let prices: Vec<f64> = listings
            .iter()
            .filter_map(|l| l.price)
            .filter(|&p| p > 0.0)
            .collect();
        if prices.is_empty() {
            return None;
        }
        let count = prices.len() as f64;
        let avg = prices.iter().sum::<f64>() / count;
        let stddev = (prices.iter().map(|p| (p - avg).powi(2)).sum::<f64>() / count).sqrt();

        Some(GroupStats {
            group: group.to_string(),
            count: prices.len(),
            avg_price: avg,
            std_dev: stddev,
            min_price: prices.iter().copied().fold(f64::INFINITY, f64::min),
            max_price: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            last_updated: Utc::now(),
        })
    }

    /// Listings under their group average by the configured share or amount.
    fn find_deals(&self, listings: &[Listing], cfg: &DealConfig) -> Vec<Deal> {
        let mut result = Vec::new();
        for (group, members) in group_listings(listings) {
            if members.len() < cfg.min_group_size {
                continue;
            }
            let Some(stats) = self.calculate_stats(&group, &members) else {
                continue;
            };
            for listing in members {
                let Some(price) = listing.price else {
                    continue;
                };
                let is_under_percent = price < stats.avg_price * (1.0 - cfg.deviation_threshold);
                let is_under_absolute = (stats.avg_price - price) >= cfg.min_price_delta;
                if is_under_percent || is_under_absolute {
                    let savings = stats.avg_price - price;
                    result.push(Deal {
                        listing_id: listing.id.clone(),
                        title: listing.title.clone(),
                        price,
                        group: group.clone(),
                        group_avg: stats.avg_price,
                        savings,
                        savings_pct: savings / stats.avg_price * 100.0,
                        url: listing.url.clone(),
                    });
                }
            }
        }
        result.sort_by(|a, b| b.savings_pct.total_cmp(&a.savings_pct));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::listing;

    const I7_16_512: &str = "Dell Inspiron 16, Intel Core i7-1355U, 16GB RAM, 512GB SSD";

    #[test]
    fn group_key_uses_family_ram_and_size() {
        let l = listing("1", "Lenovo IdeaPad 5, Intel Core i7-1255U, 16GB RAM, 512GB SSD", Some(700.0), None);
        assert_eq!(group_key(&l.specs).as_deref(), Some("Intel Core i7 / 16GB / 512GB"));

        let no_storage = listing("2", "Lenovo IdeaPad 5, Intel Core i7-1255U, 16GB RAM", Some(700.0), None);
        assert_eq!(group_key(&no_storage.specs), None);

        let a_series = listing("3", "HP 14 Laptop, AMD A9-9425, 4GB RAM, 64GB eMMC", Some(229.0), None);
        assert_eq!(group_key(&a_series.specs).as_deref(), Some("AMD A-Series / 4GB / 64GB"));
    }

    #[test]
    fn stats_over_a_group() {
        let a = listing("1", I7_16_512, Some(600.0), None);
        let b = listing("2", I7_16_512, Some(800.0), None);
        let c = listing("3", I7_16_512, None, None);
        let stats = AnalyzerImpl::new().calculate_stats("g", &[&a, &b, &c]).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.avg_price, 700.0);
        assert_eq!(stats.std_dev, 100.0);
        assert_eq!((stats.min_price, stats.max_price), (600.0, 800.0));

        assert!(AnalyzerImpl::new().calculate_stats("g", &[&c]).is_none());
    }

    #[test]
    fn deals_need_a_big_enough_group() {
        let listings = vec![
            listing("1", I7_16_512, Some(900.0), None),
            listing("2", I7_16_512, Some(950.0), None),
            listing("3", I7_16_512, Some(1000.0), None),
            listing("4", I7_16_512, Some(650.0), None),
        ];
        let cfg = DealConfig::default();
        let deals = AnalyzerImpl::new().find_deals(&listings, &cfg);
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].listing_id, "4");
        assert_eq!(deals[0].group_avg, 875.0);
        assert_eq!(deals[0].savings, 225.0);

        let strict = DealConfig {
            min_group_size: 5,
            ..DealConfig::default()
        };
        assert!(AnalyzerImpl::new().find_deals(&listings, &strict).is_empty());
    }

    #[test]
    fn group_stats_covers_each_group() {
        let listings = vec![
            listing("1", I7_16_512, Some(900.0), None),
            listing("2", "HP Pavilion, AMD Ryzen 5 7530U, 8GB RAM, 256GB SSD", Some(450.0), None),
            listing("3", "No specs at all", Some(300.0), None),
        ];
        let stats = AnalyzerImpl::new().group_stats(&listings);
        let groups: Vec<&str> = stats.iter().map(|s| s.group.as_str()).collect();
        assert_eq!(groups, vec!["AMD Ryzen 5 / 8GB / 256GB", "Intel Core i7 / 16GB / 512GB"]);
    }
}
