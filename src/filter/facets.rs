use crate::analyzer::market_indicators::{MarketAnalyzer, PriceBand};
use crate::filter::FilterField;
use crate::model::Listing;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
    pub value: String,
    pub count: usize,
}

/// Values available for filtering, with how many listings carry each.
#[derive(Debug, Clone, Serialize)]
pub struct Facets {
    pub fields: BTreeMap<FilterField, Vec<FacetCount>>,
    pub price_bands: Vec<PriceBand>,
}

/// Counts the canonical labels per field, most common first.
pub fn facets(listings: &[Listing], price_band_step: u32) -> Facets {
    let mut fields = BTreeMap::new();
    for field in FilterField::ALL {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for listing in listings {
            if let Some(value) = field.stored(listing) {
                *counts.entry(value).or_default() += 1;
            }
        }
        let mut values: Vec<FacetCount> = counts
            .into_iter()
            .map(|(value, count)| FacetCount {
                value: value.to_string(),
                count,
            })
            .collect();
        values.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
        fields.insert(field, values);
    }
    Facets {
        fields,
        price_bands: MarketAnalyzer::price_bands(listings, price_band_step),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::listing;

    #[test]
    fn counts_labels_by_frequency_then_name() {
        let listings = vec![
            listing("1", "Lenovo IdeaPad 3, 8GB RAM, 256GB SSD", Some(399.0), None),
            listing("2", "HP Pavilion 15, 16GB RAM, 512GB SSD", Some(649.0), None),
            listing("3", "HP Envy x360, 16GB RAM, 1TB SSD", Some(899.0), None),
            listing("4", "Generic notebook", None, None),
        ];
        let facets = facets(&listings, 250);

        let brands = &facets.fields[&FilterField::Brand];
        assert_eq!(
            brands,
            &vec![
                FacetCount { value: "HP".to_string(), count: 2 },
                FacetCount { value: "Lenovo".to_string(), count: 1 },
            ]
        );
        let ram = &facets.fields[&FilterField::Ram];
        assert_eq!(ram[0], FacetCount { value: "16GB".to_string(), count: 2 });
        assert!(facets.fields[&FilterField::Graphics].is_empty());

        let bands: Vec<(u32, usize)> = facets.price_bands.iter().map(|b| (b.min, b.count)).collect();
        assert_eq!(bands, vec![(250, 1), (500, 1), (750, 1)]);
    }
}
