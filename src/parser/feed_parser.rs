// JSON feed parsing
use crate::model::{ParseError, RawListing};
use crate::utils::{normalize_ws, parse_price};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub trait Parser {
    fn parse(&self, body: &str) -> Result<Vec<RawListing>, ParseError>;
}

/// Parses marketplace product feeds: a bare array of records, or an object
/// wrapping one under `results`, `products` or `items`.
pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

const ARRAY_KEYS: [&str; 3] = ["results", "products", "items"];

impl Parser for FeedParser {
    fn parse(&self, body: &str) -> Result<Vec<RawListing>, ParseError> {
        let document: Value = serde_json::from_str(body)?;
        let records = match &document {
            Value::Array(records) => records,
            Value::Object(map) => ARRAY_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_array))
                .ok_or_else(|| {
                    ParseError::UnsupportedShape(format!("object without any of {:?}", ARRAY_KEYS))
                })?,
            other => return Err(ParseError::UnsupportedShape(kind_of(other).to_string())),
        };

        let mut listings = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let Some(object) = record.as_object() else {
                warn!("Skipping feed record {}: not an object", index);
                continue;
            };
            // Scraper responses nest the product under `content`.
            let object = object.get("content").and_then(Value::as_object).unwrap_or(object);
            match parse_record(object) {
                Some(listing) => listings.push(listing),
                None => warn!("Skipping feed record {}: missing id or title", index),
            }
        }
        debug!("Parsed {} of {} feed records", listings.len(), records.len());
        Ok(listings)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| object.get(*k))
        .find(|v| !v.is_null())
}

fn text(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => normalize_ws(s),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

fn text_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(object, keys).and_then(text)
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_price(s),
        _ => None,
    }
}

fn price_field(object: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    field(object, keys).and_then(number).filter(|p| *p > 0.0)
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(text).collect(),
        Value::String(s) => s
            .lines()
            .map(normalize_ws)
            .filter(|l| !l.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Accepts `{"RAM": "16 GB"}` as well as `[{"name": "RAM", "value": "16 GB"}]`.
fn details_map(value: &Value) -> BTreeMap<String, String> {
    let mut details = BTreeMap::new();
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                if let Some(v) = text(value) {
                    details.insert(normalize_ws(key), v);
                }
            }
        }
        Value::Array(entries) => {
            for entry in entries.iter().filter_map(Value::as_object) {
                let key = field(entry, &["name", "key"]).and_then(text);
                let value = field(entry, &["value"]).and_then(text);
                if let (Some(key), Some(value)) = (key, value) {
                    details.insert(key, value);
                }
            }
        }
        _ => {}
    }
    details
}

fn parse_record(object: &Map<String, Value>) -> Option<RawListing> {
    let id = text_field(object, &["asin", "id", "sku"])?;
    let title = text_field(object, &["title", "name"])?;

    Some(RawListing {
        id,
        title,
        description: field(object, &["description"]).and_then(|v| v.as_str().map(str::to_string)),
        bullet_points: field(object, &["bullet_points", "features"])
            .map(string_list)
            .unwrap_or_default(),
        details: field(object, &["product_details", "details"])
            .map(details_map)
            .unwrap_or_default(),
        manufacturer: text_field(object, &["manufacturer", "brand"]),
        price: price_field(object, &["price", "price_upper"]),
        list_price: price_field(object, &["price_strikethrough", "list_price"]),
        currency: text_field(object, &["currency"]),
        rating: field(object, &["rating"]).and_then(number).filter(|r| (0.0..=5.0).contains(r)),
        reviews_count: field(object, &["reviews_count", "ratings_total"])
            .and_then(number)
            .map(|n| n.round() as u32),
        url: text_field(object, &["url", "link"]),
    })
}
