use crate::model::Condition;
use regex::Regex;
use std::sync::LazyLock;

static WINDOWS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bwin(?:dows)?\s*(1[01])\s*(home|pro|s\b|in\s+s\s+mode)?").unwrap()
});
static OTHER_OS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(chrome\s*os|macos|mac\s*os|ubuntu|linux|freedos|no\s+os)\b").unwrap());
static RENEWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(renewed|refurbished|reconditioned)\b").unwrap());
static USED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(used|pre-?owned|second[\s-]hand)\b").unwrap());

/// Operating system named in the text.
pub fn operating_system(text: &str) -> Option<String> {
    if let Some(c) = WINDOWS_RE.captures(text) {
        let edition = c.get(2).map(|m| m.as_str().to_lowercase());
        let edition = match edition.as_deref() {
            Some("home") => " Home",
            Some("pro") => " Pro",
            Some(_) => " S",
            None => "",
        };
        return Some(format!("Windows {}{}", &c[1], edition));
    }
    let c = OTHER_OS_RE.captures(text)?;
    let raw: String = c[1].to_lowercase().split_whitespace().collect();
    let name = match raw.as_str() {
        "chromeos" => "ChromeOS",
        "macos" => "macOS",
        "ubuntu" | "linux" => "Linux",
        _ => "No OS",
    };
    Some(name.to_string())
}

/// OS implied by the product line when the listing does not name one.
pub fn infer_os(brand: Option<&str>, model: Option<&str>, title: &str) -> Option<String> {
    if title.to_lowercase().contains("chromebook") {
        return Some("ChromeOS".to_string());
    }
    let is_mac = brand == Some("Apple") || model.is_some_and(|m| m.starts_with("MacBook"));
    is_mac.then(|| "macOS".to_string())
}

/// Condition from the title; descriptions mention "used" too freely.
pub fn condition(title: &str) -> Condition {
    if RENEWED_RE.is_match(title) {
        Condition::Renewed
    } else if USED_RE.is_match(title) {
        Condition::Used
    } else {
        Condition::New
    }
}
