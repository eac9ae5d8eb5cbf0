use crate::model::PricePoint;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Price trajectory of a single listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLifecycle {
    pub listing_id: String,
    pub previous_price: Option<f64>,
    pub price: f64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub price_changes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceDrop {
    pub listing_id: String,
    pub previous_price: f64,
    pub current_price: f64,
    pub drop: f64,
    pub drop_pct: f64,
    pub price_changes: u32,
    pub last_seen: DateTime<Utc>,
}

/// Folds a price history into one lifecycle per listing.
pub fn build_lifecycle_data(history: &[PricePoint]) -> Vec<PriceLifecycle> {
    let mut points: Vec<&PricePoint> = history.iter().collect();
    points.sort_by_key(|p| p.seen_at);

    let mut grouped: HashMap<&str, PriceLifecycle> = HashMap::new();
    for point in points {
        let entry = grouped
            .entry(point.listing_id.as_str())
            .or_insert_with(|| PriceLifecycle {
                listing_id: point.listing_id.clone(),
                previous_price: None,
                price: point.price,
                first_seen: point.seen_at,
                last_seen: point.seen_at,
                price_changes: 0,
            });

        if (point.price - entry.price).abs() > f64::EPSILON {
            entry.price_changes += 1;
            entry.previous_price = Some(entry.price);
            entry.price = point.price;
        }
        entry.last_seen = point.seen_at;
    }

    grouped.into_values().collect()
}

/// Listings whose latest price is below the one before it, biggest relative
/// drop first.
pub fn price_drops(history: &[PricePoint]) -> Vec<PriceDrop> {
    let mut drops: Vec<PriceDrop> = build_lifecycle_data(history)
        .into_iter()
        .filter_map(|life| {
            let previous = life.previous_price?;
            (life.price < previous).then(|| PriceDrop {
                drop: previous - life.price,
                drop_pct: (previous - life.price) / previous * 100.0,
                listing_id: life.listing_id,
                previous_price: previous,
                current_price: life.price,
                price_changes: life.price_changes,
                last_seen: life.last_seen,
            })
        })
        .collect();
    drops.sort_by(|a, b| {
        b.drop_pct
            .total_cmp(&a.drop_pct)
            .then_with(|| a.listing_id.cmp(&b.listing_id))
    });
    drops
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn point(id: &str, price: f64, day: i64) -> PricePoint {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        PricePoint {
            listing_id: id.to_string(),
            price,
            seen_at: start + Duration::days(day),
        }
    }

    #[test]
    fn lifecycle_counts_changes_in_time_order() {
        // Out of order on purpose.
        let history = vec![point("a", 900.0, 2), point("a", 1000.0, 0), point("a", 1000.0, 1)];
        let life = build_lifecycle_data(&history).pop().unwrap();
        assert_eq!(life.price, 900.0);
        assert_eq!(life.previous_price, Some(1000.0));
        assert_eq!(life.price_changes, 1);
        assert_eq!(life.last_seen - life.first_seen, Duration::days(2));
    }

    #[test]
    fn only_latest_decreases_are_drops() {
        let history = vec![
            point("a", 1000.0, 0),
            point("a", 800.0, 1),
            point("b", 500.0, 0),
            point("b", 450.0, 1),
            point("c", 700.0, 0),
            point("c", 750.0, 1),
            point("d", 300.0, 0),
        ];
        let drops = price_drops(&history);
        let ids: Vec<&str> = drops.iter().map(|d| d.listing_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(drops[0].drop, 200.0);
        assert_eq!(drops[0].drop_pct, 20.0);
    }
}
