use crate::model::Listing;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PriceRange(pub u32, pub u32);

/// Listings whose price falls in `[min, max)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBand {
    pub min: u32,
    pub max: u32,
    pub count: usize,
    pub avg_price: f64,
}

pub struct MarketAnalyzer;

impl MarketAnalyzer {
    pub const DEFAULT_STEP: u32 = 100;

    /// Histogram of listing prices; empty bands are omitted.
    pub fn price_bands(listings: &[Listing], step: u32) -> Vec<PriceBand> {
        let mut map: BTreeMap<PriceRange, Vec<f64>> = BTreeMap::new();
        for price in listings.iter().filter_map(|l| l.price).filter(|p| *p > 0.0) {
            map.entry(Self::get_price_range_with_step(price, step))
                .or_default()
                .push(price);
        }
        map.into_iter()
            .map(|(PriceRange(min, max), prices)| PriceBand {
                min,
                max,
                count: prices.len(),
                avg_price: prices.iter().sum::<f64>() / prices.len() as f64,
            })
            .collect()
    }

    pub fn get_price_range_with_step(price: f64, step: u32) -> PriceRange {
        let step = if step == 0 { Self::DEFAULT_STEP } else { step };
        let price_int = price.max(0.0).floor() as u32;
        let lower = price_int / step * step;
        PriceRange(lower, lower + step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::listing;

    #[test]
    fn price_ranges_use_the_step() {
        assert_eq!(MarketAnalyzer::get_price_range_with_step(1299.99, 100), PriceRange(1200, 1300));
        assert_eq!(MarketAnalyzer::get_price_range_with_step(500.0, 250), PriceRange(500, 750));
        assert_eq!(MarketAnalyzer::get_price_range_with_step(42.0, 0), PriceRange(0, 100));
    }

    #[test]
    fn bands_skip_unpriced_listings() {
        let listings = vec![
            listing("1", "a", Some(410.0), None),
            listing("2", "b", Some(490.0), None),
            listing("3", "c", Some(1020.0), None),
            listing("4", "d", None, None),
        ];
        let bands = MarketAnalyzer::price_bands(&listings, 100);
        assert_eq!(bands.len(), 2);
        assert_eq!((bands[0].min, bands[0].max, bands[0].count), (400, 500, 2));
        assert_eq!(bands[0].avg_price, 450.0);
        assert_eq!((bands[1].min, bands[1].count), (1000, 1));
    }
}
