use regex::Regex;
use std::sync::LazyLock;

/// Canonical brand name and the pattern that recognizes it in a title.
static BRANDS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("Apple", r"\bapple\b"),
        ("Dell", r"\bdell\b"),
        ("HP", r"\bhp\b|\bhewlett[\s-]*packard\b"),
        ("Lenovo", r"\blenovo\b"),
        ("ASUS", r"\basus(?:tek)?\b"),
        ("Acer", r"\bacer\b"),
        ("MSI", r"\bmsi\b"),
        ("Samsung", r"\bsamsung\b"),
        ("LG", r"\blg\b"),
        ("Razer", r"\brazer\b"),
        ("Gigabyte", r"\bgigabyte\b"),
        ("Alienware", r"\balienware\b"),
        ("Huawei", r"\bhuawei\b"),
        ("Toshiba", r"\btoshiba\b|\bdynabook\b"),
        ("Framework", r"\bframework\s+laptop\b"),
        ("Chuwi", r"\bchuwi\b"),
        ("Jumper", r"\bjumper\b"),
        ("Panasonic", r"\bpanasonic\b"),
        ("Fujitsu", r"\bfujitsu\b"),
        ("Xiaomi", r"\bxiaomi\b"),
        ("Honor", r"\bhonor\b"),
        ("Gateway", r"\bgateway\b"),
        ("Microsoft", r"\bmicrosoft\s+surface\b"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(&format!("(?i){}", pattern)).unwrap()))
    .collect()
});

/// Product lines: brand, display name, pattern.
static SERIES: LazyLock<Vec<(&'static str, &'static str, Regex)>> = LazyLock::new(|| {
    [
        ("Apple", "MacBook Air", r"\bmacbook\s+air\b"),
        ("Apple", "MacBook Pro", r"\bmacbook\s+pro\b"),
        ("Apple", "MacBook", r"\bmacbook\b"),
        ("Lenovo", "ThinkPad", r"\bthinkpad\b"),
        ("Lenovo", "ThinkBook", r"\bthinkbook\b"),
        ("Lenovo", "IdeaPad", r"\bideapad\b"),
        ("Lenovo", "Legion", r"\blegion\b"),
        ("Lenovo", "Yoga", r"\byoga\b"),
        ("Lenovo", "LOQ", r"\bloq\b"),
        ("Dell", "XPS", r"\bxps\b"),
        ("Dell", "Inspiron", r"\binspiron\b"),
        ("Dell", "Latitude", r"\blatitude\b"),
        ("Dell", "Vostro", r"\bvostro\b"),
        ("Dell", "Precision", r"\bprecision\s+\d{4}\b"),
        ("HP", "Pavilion", r"\bpavilion\b"),
        ("HP", "Envy", r"\benvy\b"),
        ("HP", "Spectre", r"\bspectre\b"),
        ("HP", "EliteBook", r"\belitebook\b"),
        ("HP", "ProBook", r"\bprobook\b"),
        ("HP", "ZBook", r"\bzbook\b"),
        ("HP", "OMEN", r"\bomen\b"),
        ("HP", "Victus", r"\bvictus\b"),
        ("ASUS", "Zenbook", r"\bzenbook\b"),
        ("ASUS", "Vivobook", r"\bvivobook\b"),
        ("ASUS", "ROG", r"\brog\b"),
        ("ASUS", "TUF", r"\btuf\b"),
        ("ASUS", "ProArt", r"\bproart\b"),
        ("ASUS", "ExpertBook", r"\bexpertbook\b"),
        ("Acer", "Aspire", r"\baspire\b"),
        ("Acer", "Swift", r"\bswift\b"),
        ("Acer", "Nitro", r"\bnitro\b"),
        ("Acer", "Predator", r"\bpredator\b"),
        ("Acer", "TravelMate", r"\btravelmate\b"),
        ("MSI", "Katana", r"\bkatana\b"),
        ("MSI", "Stealth", r"\bstealth\b"),
        ("MSI", "Raider", r"\braider\b"),
        ("MSI", "Titan", r"\btitan\b"),
        ("MSI", "Vector", r"\bvector\b"),
        ("MSI", "Cyborg", r"\bcyborg\b"),
        ("MSI", "Prestige", r"\bprestige\b"),
        ("MSI", "Modern", r"\bmodern\s+\d{2}\b"),
        ("MSI", "Thin GF63", r"\bthin\s+gf63\b"),
        ("MSI", "Sword", r"\bsword\b"),
        ("MSI", "Pulse", r"\bpulse\s+\d{2}\b"),
        ("Microsoft", "Surface Laptop", r"\bsurface\s+laptop\b"),
        ("Microsoft", "Surface Pro", r"\bsurface\s+pro\b"),
        ("Microsoft", "Surface Book", r"\bsurface\s+book\b"),
        ("Microsoft", "Surface Go", r"\bsurface\s+go\b"),
        ("Samsung", "Galaxy Book", r"\bgalaxy\s+book"),
        ("LG", "gram", r"\bgram\b"),
        ("Razer", "Blade", r"\bblade\s+\d{2}\b"),
        ("Gigabyte", "AORUS", r"\baorus\b"),
        ("Google", "Pixelbook", r"\bpixelbook\b"),
        ("Huawei", "MateBook", r"\bmatebook\b"),
        ("Honor", "MagicBook", r"\bmagicbook\b"),
        ("Framework", "Framework Laptop", r"\bframework\s+laptop\b"),
    ]
    .into_iter()
    .map(|(brand, name, pattern)| (brand, name, Regex::new(&format!("(?i){}", pattern)).unwrap()))
    .collect()
});

static MODEL_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:[a-z]{0,3}\d{1,5}[a-z]{0,4}\d?|x360|pro|plus|air|max|ultra|slim|flex|carbon|nano|yoga|gen|strix|scar|zephyrus|flow|duo|fold|edge|go|studio|oled|elite|titanium|spin|helios|neo|lite|extreme|se|creator|dragonfly|book\d?|s|x)$",
    )
    .unwrap()
});
static SPEC_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\d+(?:gb|tb|hz|w|wh|mp|k|p|g)|i\d|m\d|20[12]\d|rtx|gtx)$").unwrap()
});

const MAX_MODEL_TOKENS: usize = 4;

/// Maps a free-form brand or manufacturer string to its canonical name.
pub fn canonical_brand(text: &str) -> Option<String> {
    BRANDS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(name, _)| name.to_string())
        .or_else(|| {
            let lower = text.trim().to_lowercase();
            match lower.as_str() {
                "microsoft" => Some("Microsoft".to_string()),
                "google" => Some("Google".to_string()),
                _ => None,
            }
        })
}

/// Brand named in a title: the earliest brand mention wins, then the brand
/// implied by a product line.
pub fn parse_brand(title: &str) -> Option<String> {
    BRANDS
        .iter()
        .filter_map(|(name, re)| re.find(title).map(|m| (m.start(), *name)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, name)| name.to_string())
        .or_else(|| {
            SERIES
                .iter()
                .filter_map(|(brand, _, re)| re.find(title).map(|m| (m.start(), *brand)))
                .min_by_key(|(pos, _)| *pos)
                .map(|(_, brand)| brand.to_string())
        })
}

/// Product line plus trailing model tokens, e.g. `ThinkPad X1 Carbon Gen 11`.
pub fn parse_model(title: &str) -> Option<String> {
    let (name, end) = SERIES
        .iter()
        .filter_map(|(_, name, re)| re.find(title).map(|m| (m.start(), *name, m.end())))
        .min_by_key(|(pos, _, _)| *pos)
        .map(|(_, name, end)| (name, end))?;

    let mut model = name.to_string();
    // Patterns that include a number (`Blade 15`) already consumed it.
    let consumed = title[..end]
        .split_whitespace()
        .last()
        .filter(|t| t.chars().all(|c| c.is_ascii_digit()));
    if let Some(number) = consumed {
        model.push(' ');
        model.push_str(number);
    }

    let rest = &title[end..];
    if rest.starts_with(|c: char| c.is_alphanumeric()) {
        // Series matched as a prefix (`Galaxy Book3`): keep the suffix.
        let suffix: String = rest.chars().take_while(|c| c.is_alphanumeric()).collect();
        model.push_str(&suffix);
    }
    let rest = rest.trim_start_matches(|c: char| c.is_alphanumeric());

    for (count, token) in rest.split_whitespace().enumerate() {
        if count >= MAX_MODEL_TOKENS {
            break;
        }
        let stop = token.ends_with([',', '|', '-', ';', ':']) || token.starts_with('(');
        let word = token.trim_end_matches([',', '|', '-', ';', ':']);
        if word.is_empty() || SPEC_TOKEN_RE.is_match(word) || !MODEL_TOKEN_RE.is_match(word) {
            break;
        }
        model.push(' ');
        model.push_str(word);
        if stop {
            break;
        }
    }
    Some(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earliest_brand_mention_wins() {
        assert_eq!(parse_brand("Dell Inspiron 15 with HP-style keyboard").as_deref(), Some("Dell"));
        assert_eq!(parse_brand("HP Envy x360 2-in-1").as_deref(), Some("HP"));
        assert_eq!(parse_brand("ASUSTeK Vivobook 15").as_deref(), Some("ASUS"));
    }

    #[test]
    fn brand_from_product_line() {
        assert_eq!(parse_brand("2024 Newest ThinkPad E16 Business Laptop").as_deref(), Some("Lenovo"));
        assert_eq!(parse_brand("MacBook Air 13-inch").as_deref(), Some("Apple"));
        assert_eq!(parse_brand("Surface Laptop 5").as_deref(), Some("Microsoft"));
        assert_eq!(parse_brand("Laptop with Microsoft Office"), None);
    }

    #[test]
    fn canonicalizes_manufacturer_strings() {
        assert_eq!(canonical_brand("Hewlett Packard").as_deref(), Some("HP"));
        assert_eq!(canonical_brand("LENOVO").as_deref(), Some("Lenovo"));
        assert_eq!(canonical_brand("Microsoft").as_deref(), Some("Microsoft"));
        assert_eq!(canonical_brand("Unknown Corp"), None);
    }

    #[test]
    fn models_collect_trailing_tokens() {
        assert_eq!(
            parse_model("Lenovo ThinkPad X1 Carbon Gen 11 Laptop, 14\"").as_deref(),
            Some("ThinkPad X1 Carbon Gen 11")
        );
        assert_eq!(parse_model("ASUS ROG Strix G16 (2024) Gaming Laptop").as_deref(), Some("ROG Strix G16"));
        assert_eq!(parse_model("Lenovo Legion 5 Pro 16\" QHD").as_deref(), Some("Legion 5 Pro"));
        assert_eq!(parse_model("HP Envy x360 2-in-1").as_deref(), Some("Envy x360"));
        assert_eq!(parse_model("Samsung Galaxy Book3 Pro 360").as_deref(), Some("Galaxy Book3 Pro 360"));
        assert_eq!(parse_model("Razer Blade 15 Gaming Laptop").as_deref(), Some("Blade 15"));
        assert_eq!(parse_model("Apple MacBook Air, M2").as_deref(), Some("MacBook Air"));
        assert_eq!(parse_model("Lenovo IdeaPad 3 16GB RAM").as_deref(), Some("IdeaPad 3"));
    }

    #[test]
    fn no_series_means_no_model() {
        assert_eq!(parse_model("Generic 15.6 inch laptop"), None);
    }
}
