use crate::extract::storage::MIN_DRIVE_GB;
use regex::Regex;
use std::sync::LazyLock;

/// Sizes that actually ship as laptop memory.
const VALID_SIZES_GB: [u32; 17] = [2, 3, 4, 6, 8, 12, 16, 18, 20, 24, 32, 36, 40, 48, 64, 96, 128];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    pub size_gb: u32,
    pub kind: Option<String>,
}

impl Memory {
    pub fn label(&self) -> String {
        format!("{}GB", self.size_gb)
    }
}

static WITH_KIND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3})\s*gb\s*(?:of\s*)?(?:high[\s-]speed\s*)?((?:lp)?ddr\dx?|unified\s*memory)").unwrap()
});
static KIND_FIRST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b((?:lp)?ddr\dx?)\s*(\d{1,3})\s*gb\b").unwrap());
static SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,3})\s*gb\s*(?:(?:of|high[\s-]speed|system|total|onboard|soldered)\s*)*(?:ram|memory)\b",
    )
    .unwrap()
});
static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:ram|memory)\s*[:\-]?\s*(\d{1,3})\s*gb\b").unwrap());
static PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3})\s*gb?\s*[/|+]\s*(\d{1,4})\s*(gb?|tb)\b").unwrap()
});
static BARE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,3})\s*gb\b").unwrap());
static KIND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b((?:lp)?ddr\dx?)\b|\bunified\s*memory\b").unwrap());

fn valid(size: &str) -> Option<u32> {
    let size: u32 = size.parse().ok()?;
    VALID_SIZES_GB.contains(&size).then_some(size)
}

fn canonical_kind(raw: &str) -> String {
    let compact: String = raw.split_whitespace().collect::<String>().to_uppercase();
    if compact.starts_with("UNIFIED") {
        "Unified".to_string()
    } else {
        compact
    }
}

/// Recognizes RAM size in free text; requires a RAM/memory marker.
pub fn parse(text: &str) -> Option<Memory> {
    for caps in WITH_KIND_RE.captures_iter(text) {
        if let Some(size_gb) = valid(&caps[1]) {
            return Some(Memory {
                size_gb,
                kind: Some(canonical_kind(&caps[2])),
            });
        }
    }
    for caps in KIND_FIRST_RE.captures_iter(text) {
        if let Some(size_gb) = valid(&caps[2]) {
            return Some(Memory {
                size_gb,
                kind: Some(canonical_kind(&caps[1])),
            });
        }
    }
    for re in [&*SUFFIX_RE, &*PREFIX_RE] {
        for caps in re.captures_iter(text) {
            if let Some(size_gb) = valid(&caps[1]) {
                return Some(Memory { size_gb, kind: None });
            }
        }
    }
    // `16GB/512GB`: the first value is memory when the second looks like a drive.
    for caps in PAIR_RE.captures_iter(text) {
        let second: u32 = caps[2].parse().unwrap_or(0);
        let is_drive = caps[3].eq_ignore_ascii_case("tb") || second >= MIN_DRIVE_GB;
        if let (Some(size_gb), true) = (valid(&caps[1]), is_drive) {
            return Some(Memory { size_gb, kind: None });
        }
    }
    None
}

/// Lenient variant for a product-details value already known to be RAM.
pub fn parse_detail(text: &str) -> Option<Memory> {
    parse(text).or_else(|| {
        let caps = BARE_RE.captures(text)?;
        Some(Memory {
            size_gb: valid(&caps[1])?,
            kind: parse_kind(text),
        })
    })
}

/// Memory technology mentioned anywhere in the text.
pub fn parse_kind(text: &str) -> Option<String> {
    KIND_RE.captures(text).map(|c| match c.get(1) {
        Some(kind) => canonical_kind(kind.as_str()),
        None => "Unified".to_string(),
    })
}
