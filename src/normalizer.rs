use crate::extract::{ExtractInput, clean_text, extract_specs};
use crate::model::{Listing, RawListing};
use crate::utils::html_to_text;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

const ACCESSORY_WORDS: [&str; 9] = [
    "case",
    "sleeve",
    "charger",
    "adapter",
    "bag",
    "skin",
    "stand",
    "keyboard cover",
    "screen protector",
];

/// Turns raw feed records into catalog listings. Later records replace
/// earlier ones with the same id; accessories are dropped.
pub fn normalize_all(raw: &[RawListing], feed: &str, now: DateTime<Utc>) -> Vec<Listing> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_id: HashMap<&str, Listing> = HashMap::new();

    for record in raw {
        let listing = normalize_listing(record, feed, now);
        if is_accessory(&listing) {
            debug!("Dropping accessory {}: {}", listing.id, listing.title);
            continue;
        }
        if by_id.insert(record.id.as_str(), listing).is_none() {
            order.push(record.id.as_str());
        }
    }

    order.into_iter().filter_map(|id| by_id.remove(id)).collect()
}

pub fn normalize_listing(raw: &RawListing, feed: &str, now: DateTime<Utc>) -> Listing {
    let description = raw.description.as_deref().map(html_to_text).unwrap_or_default();
    let mut details = raw.details.clone();
    if let Some(manufacturer) = &raw.manufacturer {
        details.entry("Manufacturer".to_string()).or_insert_with(|| manufacturer.clone());
    }
    let specs = extract_specs(&ExtractInput {
        title: &raw.title,
        details: &details,
        bullet_points: &raw.bullet_points,
        description: &description,
    });

    Listing {
        id: raw.id.clone(),
        feed: feed.to_string(),
        title: clean_text(&raw.title),
        description,
        price: raw.price,
        list_price: raw.list_price,
        currency: raw.currency.clone(),
        rating: raw.rating,
        reviews_count: raw.reviews_count,
        url: raw.url.clone(),
        specs,
        first_seen: now,
        last_seen: now,
    }
}

/// Cases, chargers and the like: an accessory word in the title and no
/// processor anywhere in the listing.
pub fn is_accessory(listing: &Listing) -> bool {
    if listing.specs.processor.is_some() {
        return false;
    }
    let title = listing.title.to_lowercase();
    ACCESSORY_WORDS.iter().any(|word| {
        title
            .match_indices(word)
            .any(|(at, _)| is_word_boundary(&title, at, word.len()))
    })
}

fn is_word_boundary(text: &str, start: usize, len: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[start + len..].chars().next();
    // Plurals count: `cases`, `bags`.
    let after_ok = match after {
        Some('s') => text[start + len + 1..].chars().next().is_none_or(|c| !c.is_alphanumeric()),
        Some(c) => !c.is_alphanumeric(),
        None => true,
    };
    before.is_none_or(|c| !c.is_alphanumeric()) && after_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpecSource;
    use chrono::TimeZone;

    fn raw(id: &str, title: &str) -> RawListing {
        RawListing {
            id: id.to_string(),
            title: title.to_string(),
            price: Some(499.0),
            ..Default::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn extracts_specs_and_strips_markup() {
        let mut record = raw("1", "Lenovo IdeaPad Slim 3™ 15.6\" Laptop");
        record.description = Some("<p>Powered by an <b>AMD Ryzen 7 7730U</b>&nbsp;processor</p>".to_string());
        record.details.insert("RAM".to_string(), "16 GB".to_string());

        let listings = normalize_all(&[record], "amazon", now());
        let listing = &listings[0];
        assert_eq!(listing.title, "Lenovo IdeaPad Slim 3 15.6\" Laptop");
        assert!(!listing.description.contains('<'));
        assert_eq!(listing.feed, "amazon");
        assert_eq!(listing.first_seen, now());

        let cpu = listing.specs.processor.as_ref().unwrap();
        assert_eq!(cpu.label, "AMD Ryzen 7 (7000 Series)");
        assert_eq!(cpu.source, SpecSource::Description);
        assert_eq!(listing.specs.ram.as_ref().unwrap().source, SpecSource::Details);
    }

    #[test]
    fn manufacturer_backs_up_the_brand() {
        let mut record = raw("1", "15.6 inch Laptop, 8GB RAM, 256GB SSD");
        record.manufacturer = Some("ASUSTeK COMPUTER INC.".to_string());
        let listing = normalize_listing(&record, "f", now());
        assert_eq!(listing.specs.brand_label(), Some("ASUS"));
        assert_eq!(listing.specs.brand.unwrap().source, SpecSource::Details);
    }

    #[test]
    fn duplicate_ids_keep_the_last_record_in_first_position() {
        let mut later = raw("a", "HP Pavilion 15, 16GB RAM");
        later.price = Some(599.0);
        let records = vec![raw("a", "HP Pavilion 15, 8GB RAM"), raw("b", "Dell Inspiron 14"), later];
        let listings = normalize_all(&records, "f", now());
        let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(listings[0].price, Some(599.0));
        assert_eq!(listings[0].specs.ram_label(), Some("16GB"));
    }

    #[test]
    fn accessories_are_dropped() {
        let records = vec![
            raw("1", "Laptop Sleeve Case for 15.6 inch MacBook Pro"),
            raw("2", "65W USB-C Laptop Charger for Dell XPS"),
            raw("3", "Laptop Stand, Adjustable Aluminum"),
            raw("4", "Dell XPS 15 with Intel Core i7-13700H, carrying case included"),
            raw("5", "ASUS Vivobook Standard Edition 15.6\""),
        ];
        let listings = normalize_all(&records, "f", now());
        let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "5"]);
    }
}
