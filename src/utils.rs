// Utility functions
use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

// A space only groups thousands when exactly three digits follow it.
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+|\s\d{3}\b)*").unwrap());

/// Collapses runs of whitespace into single spaces and trims.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips markup from an HTML fragment, keeping its text content.
pub fn html_to_text(fragment: &str) -> String {
    if !fragment.contains('<') {
        return normalize_ws(&fragment.replace("&nbsp;", " ").replace("&amp;", "&"));
    }
    let doc = Html::parse_fragment(fragment);
    let text: Vec<&str> = doc.root_element().text().collect();
    normalize_ws(&text.join(" "))
}

/// Parses a price string such as `$1,299.99`, `1.299,99 €` or `899`.
pub fn parse_price(text: &str) -> Option<f64> {
    let raw = PRICE_RE.find(text)?.as_str();
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = digits.trim_end_matches(['.', ',']);

    let last_dot = digits.rfind('.');
    let last_comma = digits.rfind(',');
    let normalized = match (last_dot, last_comma) {
        (Some(d), Some(c)) if c > d => digits.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => digits.replace(',', ""),
        // A lone comma followed by exactly two digits is a decimal separator.
        (None, Some(c)) if digits.len() - c == 3 && digits.matches(',').count() == 1 => {
            digits.replace(',', ".")
        }
        (None, Some(_)) => digits.replace(',', ""),
        (Some(d), None) if digits.matches('.').count() > 1 || digits.len() - d == 4 => {
            digits.replace('.', "")
        }
        _ => digits.to_string(),
    };
    normalized.parse::<f64>().ok().filter(|p| *p > 0.0)
}

/// Lowercases and splits into alphanumeric tokens.
pub fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '.'))
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
