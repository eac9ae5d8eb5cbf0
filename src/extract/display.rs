use regex::Regex;
use std::sync::LazyLock;

const MIN_SCREEN_IN: f64 = 10.0;
const MAX_SCREEN_IN: f64 = 18.4;

static SCREEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(\d{2}(?:\.\d{1,2})?)\s*(?:"|”|″|''|-?\s*inch(?:es)?\b|-?\s*in\b|\s*zoll\b)"#).unwrap()
});
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2}(?:\.\d{1,2})?)\b").unwrap());
static PIXELS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{4})\s*[x×*]\s*(\d{3,4})\b").unwrap());
static NAMED_RES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(4k(?:\s*uhd)?|uhd\+?|qhd\+?|wqxga|wuxga|fhd\+?|full\s*hd|2\.8k|2\.5k|3k|retina|hd\+?)(?:\s|$|[,|)/])")
        .unwrap()
});
static REFRESH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(\d{2,3})\s*hz\b").unwrap());
static NON_TOUCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnon[\s-]?touch").unwrap());
static TOUCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btouch(?:[\s-]?screen)?\b").unwrap());

fn in_range(size: f64) -> Option<f64> {
    (MIN_SCREEN_IN..=MAX_SCREEN_IN).contains(&size).then_some(size)
}

/// Screen diagonal in inches; requires an inch marker.
pub fn screen_size(text: &str) -> Option<f64> {
    for caps in SCREEN_RE.captures_iter(text) {
        let end = caps.get(0).map_or(0, |m| m.end());
        // `12-in-1` and `2-in-1` are form factors, not sizes.
        if text[end..].starts_with("-1") || text[end..].starts_with("-one") {
            continue;
        }
        if let Some(size) = caps[1].parse().ok().and_then(in_range) {
            return Some(size);
        }
    }
    None
}

/// Lenient variant for a product-details value already known to be a size.
pub fn screen_size_detail(text: &str) -> Option<f64> {
    screen_size(text).or_else(|| {
        let caps = NUMBER_RE.captures(text)?;
        caps[1].parse().ok().and_then(in_range)
    })
}

/// `15.6` → `15.6"`, `14.0` → `14"`.
pub fn screen_label(size: f64) -> String {
    let rounded = (size * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}\"", rounded as u32)
    } else {
        format!("{:.1}\"", rounded)
    }
}

fn resolution_name(width: u32, height: u32) -> String {
    match (width, height) {
        (1366, 768) => "HD".to_string(),
        (1600, 900) => "HD+".to_string(),
        (1920, 1080) => "FHD".to_string(),
        (1920, 1200) => "WUXGA".to_string(),
        (2560, 1440) => "QHD".to_string(),
        (2560, 1600) => "QHD+".to_string(),
        (2880, 1800) => "2.8K".to_string(),
        (3840, 2160) => "4K UHD".to_string(),
        (3840, 2400) => "4K UHD+".to_string(),
        _ => format!("{}x{}", width, height),
    }
}

/// Display resolution, named where a common name exists.
pub fn resolution(text: &str) -> Option<String> {
    if let Some(caps) = PIXELS_RE.captures(text) {
        let width: u32 = caps[1].parse().ok()?;
        let height: u32 = caps[2].parse().ok()?;
        if width > height {
            return Some(resolution_name(width, height));
        }
    }
    for caps in NAMED_RES_RE.captures_iter(text) {
        let m = caps.get(1)?;
        let after = text[m.end()..].trim_start().to_lowercase();
        if ["graphics", "webcam", "camera", "cam "].iter().any(|w| after.starts_with(w)) {
            continue;
        }
        let raw = m.as_str().to_lowercase();
        let compact: String = raw.split_whitespace().collect();
        let name = match compact.as_str() {
            "4k" | "4kuhd" | "uhd" => "4K UHD",
            "uhd+" => "4K UHD+",
            "qhd" => "QHD",
            "qhd+" => "QHD+",
            "wqxga" => "QHD+",
            "wuxga" => "WUXGA",
            "fhd" | "fullhd" => "FHD",
            "fhd+" => "FHD+",
            "2.8k" => "2.8K",
            "2.5k" => "2.5K",
            "3k" => "3K",
            "retina" => "Retina",
            "hd+" => "HD+",
            _ => "HD",
        };
        return Some(name.to_string());
    }
    None
}

pub fn refresh_rate(text: &str) -> Option<u32> {
    REFRESH_RE
        .captures_iter(text)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .find(|hz| (60..=480).contains(hz))
}

/// `Some(true)` for touch displays, `Some(false)` when explicitly non-touch.
pub fn touchscreen(text: &str) -> Option<bool> {
    if NON_TOUCH_RE.is_match(text) {
        Some(false)
    } else if TOUCH_RE.is_match(text) {
        Some(true)
    } else {
        None
    }
}
