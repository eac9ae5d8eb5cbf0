use regex::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuVendor {
    Intel,
    Amd,
    Apple,
    Qualcomm,
    MediaTek,
}

impl CpuVendor {
    pub fn as_str(&self) -> &'static str {
        match self {
            CpuVendor::Intel => "Intel",
            CpuVendor::Amd => "AMD",
            CpuVendor::Apple => "Apple",
            CpuVendor::Qualcomm => "Qualcomm",
            CpuVendor::MediaTek => "MediaTek",
        }
    }

    /// Recognizes a bare vendor name such as `Intel` or `Apple Silicon`.
    pub fn from_name(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        let lower = lower.trim();
        if lower.starts_with("intel") {
            Some(CpuVendor::Intel)
        } else if lower.starts_with("amd") || lower == "ryzen" {
            Some(CpuVendor::Amd)
        } else if lower.starts_with("apple") || lower == "m-series" || lower == "m series" {
            Some(CpuVendor::Apple)
        } else if lower.starts_with("qualcomm") || lower == "snapdragon" {
            Some(CpuVendor::Qualcomm)
        } else if lower.starts_with("mediatek") {
            Some(CpuVendor::MediaTek)
        } else {
            None
        }
    }
}

impl fmt::Display for CpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognized processor, e.g. vendor Intel, family `Core i7`,
/// qualifier `13th Gen`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processor {
    pub vendor: CpuVendor,
    pub family: String,
    pub qualifier: Option<String>,
}

impl Processor {
    fn new(vendor: CpuVendor, family: impl Into<String>, qualifier: Option<String>) -> Self {
        Self {
            vendor,
            family: family.into(),
            qualifier,
        }
    }

    pub fn label(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{} {} ({})", self.vendor, self.family, q),
            None => format!("{} {}", self.vendor, self.family),
        }
    }
}

type Rule = (LazyLock<Regex>, fn(&Captures<'_>) -> Option<Processor>);

macro_rules! rule {
    ($re:expr, $f:expr) => {
        (LazyLock::new(|| Regex::new($re).unwrap()), $f)
    };
}

// Ordered: the first rule that matches anywhere in the text wins.
static RULES: [Rule; 20] = [
    rule!(r"(?i)\bcore\s*ultra\s*([579])\s*\(series\s*(\d)\)", |c| {
        Some(Processor::new(
            CpuVendor::Intel,
            format!("Core Ultra {}", &c[1]),
            ultra_series(&c[2]),
        ))
    }),
    rule!(r"(?i)\b(?:intel\s*)?(?:core\s*)?ultra\s*([579])(?:[\s-]+(\d)\d{2}[a-z]{0,2}\b)?", |c| {
        let series = c.get(2).and_then(|m| ultra_series(m.as_str()));
        Some(Processor::new(CpuVendor::Intel, format!("Core Ultra {}", &c[1]), series))
    }),
    rule!(r"(?i)\bcore\s*ultra\b", |_| Some(Processor::new(CpuVendor::Intel, "Core Ultra", None))),
    rule!(r"(?i)\b(?:core\s*)?i([3579])[\s-]+(\d{4,5})([a-z]{0,2}\d?)\b", |c| {
        let generation = intel_generation(&c[2])?;
        Some(Processor::new(
            CpuVendor::Intel,
            format!("Core i{}", &c[1]),
            Some(format!("{} Gen", ordinal(generation))),
        ))
    }),
    rule!(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\s*gen(?:eration)?\s*(?:intel\s*)?(?:core\s*)?i([3579])\b",
        |c| intel_core_with_generation(&c[2], &c[1])
    ),
    rule!(
        r"(?i)\bi([3579])\s*(?:processor\s*)?[(,]?\s*(\d{1,2})(?:st|nd|rd|th)\s*gen",
        |c| intel_core_with_generation(&c[1], &c[2])
    ),
    rule!(r"(?i)\b(?:intel\s+)?(?:core\s*)?i([3579])\b", |c| {
        Some(Processor::new(CpuVendor::Intel, format!("Core i{}", &c[1]), None))
    }),
    rule!(r"(?i)\bcore\s*m([357])\b", |c| {
        Some(Processor::new(CpuVendor::Intel, format!("Core m{}", &c[1]), None))
    }),
    rule!(r"(?i)\bceleron\b", |_| Some(Processor::new(CpuVendor::Intel, "Celeron", None))),
    rule!(r"(?i)\bpentium\b(?:\s*(silver|gold))?", |c| {
        let family = match c.get(1) {
            Some(tier) => format!("Pentium {}", capitalize(tier.as_str())),
            None => "Pentium".to_string(),
        };
        Some(Processor::new(CpuVendor::Intel, family, None))
    }),
    rule!(
        r"(?i)\b(?:intel\s*(?:processor\s*)?n\d{2,3}|n(?:50|95|97|100|150|200|250|300|305|355))\b|\bn-series\b",
        |_| Some(Processor::new(CpuVendor::Intel, "N-Series", None))
    ),
    rule!(r"(?i)\batom\b", |_| Some(Processor::new(CpuVendor::Intel, "Atom", None))),
    rule!(r"(?i)\bxeon\b", |_| Some(Processor::new(CpuVendor::Intel, "Xeon", None))),
    rule!(r"(?i)\bryzen\s*ai\s*([579])\b", |c| {
        Some(Processor::new(CpuVendor::Amd, format!("Ryzen AI {}", &c[1]), None))
    }),
    rule!(r"(?i)\bryzen\s*([3579])\s*\((\d)000\s*series\)", |c| {
        Some(Processor::new(
            CpuVendor::Amd,
            format!("Ryzen {}", &c[1]),
            Some(format!("{}000 Series", &c[2])),
        ))
    }),
    rule!(r"(?i)\bryzen\s*([3579])\s*(?:pro\s*)?[\s-]*(\d)\d{3}[a-z]{0,2}\b", |c| {
        Some(Processor::new(
            CpuVendor::Amd,
            format!("Ryzen {}", &c[1]),
            Some(format!("{}000 Series", &c[2])),
        ))
    }),
    rule!(r"(?i)\bryzen\s*([3579])\b", |c| {
        Some(Processor::new(CpuVendor::Amd, format!("Ryzen {}", &c[1]), None))
    }),
    rule!(r"(?i)\b(athlon)\b|\bamd\s*a(?:4|6|9|10|12)\b|\bamd\s*a-series\b", |c| {
        let family = if c.get(1).is_some() { "Athlon" } else { "A-Series" };
        Some(Processor::new(CpuVendor::Amd, family, None))
    }),
    rule!(
        r"(?i)\bapple\s*m([1-4])(?:\s*(pro|max|ultra))?\b|\bm([1-4])(?:\s*(pro|max|ultra))?\s*chip\b",
        |c| {
            let chip = c.get(1).or_else(|| c.get(3))?.as_str();
            let tier = c.get(2).or_else(|| c.get(4)).map(|m| capitalize(m.as_str()));
            let family = match tier {
                Some(tier) => format!("M{} {}", chip, tier),
                None => format!("M{}", chip),
            };
            Some(Processor::new(CpuVendor::Apple, family, None))
        }
    ),
    rule!(r"(?i)\bsnapdragon\s*(x\s*elite|x\s*plus|x|8cx|7c\+?)", |c| {
        let compact: String = c[1].split_whitespace().collect::<String>().to_lowercase();
        let variant = match compact.as_str() {
            "xelite" => "X Elite",
            "xplus" => "X Plus",
            "x" => "X",
            "8cx" => "8cx",
            _ => "7c",
        };
        Some(Processor::new(CpuVendor::Qualcomm, format!("Snapdragon {}", variant), None))
    }),
];

static MACBOOK_M_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bm([1-4])(?:\s+(pro|max|ultra))?\b").unwrap());
static MEDIATEK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bmediatek\b(?:\s*(kompanio))?|\b(mt8\d{3})\b").unwrap());

/// Recognizes the processor mentioned in `text`.
pub fn parse(text: &str) -> Option<Processor> {
    for (re, build) in RULES.iter() {
        if let Some(found) = re.captures(text).and_then(|c| build(&c)) {
            return Some(found);
        }
    }
    // A bare `M2` is only trusted next to MacBook branding.
    let lower = text.to_lowercase();
    if lower.contains("macbook") || lower.contains("apple") {
        if let Some(c) = MACBOOK_M_RE.captures(text) {
            let family = match c.get(2) {
                Some(tier) => format!("M{} {}", &c[1], capitalize(tier.as_str())),
                None => format!("M{}", &c[1]),
            };
            return Some(Processor::new(CpuVendor::Apple, family, None));
        }
    }
    MEDIATEK_RE.captures(text).map(|c| {
        let family = if c.get(1).is_some() || c.get(2).is_some() { "Kompanio" } else { "Processor" };
        Processor::new(CpuVendor::MediaTek, family, None)
    })
}

/// Generation from an Intel model number: `8250` → 8, `1135` → 11,
/// `10750` → 10, `13700` → 13.
fn intel_generation(digits: &str) -> Option<u32> {
    let bytes = digits.as_bytes();
    let first = (bytes[0] - b'0') as u32;
    let second = (*bytes.get(1)? - b'0') as u32;
    if first == 1 && second <= 4 {
        Some(10 + second)
    } else if digits.len() == 4 && first >= 2 {
        Some(first)
    } else {
        None
    }
}

/// Core Ultra series 1 parts carry no qualifier; later series are named.
fn ultra_series(digit: &str) -> Option<String> {
    let series: u32 = digit.parse().ok()?;
    (series >= 2).then(|| format!("Series {}", series))
}

fn intel_core_with_generation(tier: &str, generation: &str) -> Option<Processor> {
    let generation: u32 = generation.parse().ok()?;
    if !(2..=14).contains(&generation) {
        return None;
    }
    Some(Processor::new(
        CpuVendor::Intel,
        format!("Core i{}", tier),
        Some(format!("{} Gen", ordinal(generation))),
    ))
}

pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(text: &str) -> Option<String> {
        parse(text).map(|p| p.label())
    }

    #[test]
    fn intel_generation_from_model_numbers() {
        assert_eq!(label("Intel Core i5-8250U").as_deref(), Some("Intel Core i5 (8th Gen)"));
        assert_eq!(label("Core i5-1035G1").as_deref(), Some("Intel Core i5 (10th Gen)"));
        assert_eq!(label("i7-1165G7 quad core").as_deref(), Some("Intel Core i7 (11th Gen)"));
        assert_eq!(label("Intel i9-14900HX").as_deref(), Some("Intel Core i9 (14th Gen)"));
        assert_eq!(label("Core i3 1215U").as_deref(), Some("Intel Core i3 (12th Gen)"));
    }

    #[test]
    fn intel_generation_from_words() {
        assert_eq!(
            label("13th Gen Intel Core i7 Processor").as_deref(),
            Some("Intel Core i7 (13th Gen)")
        );
        assert_eq!(label("Intel Core i7 (13th Gen)").as_deref(), Some("Intel Core i7 (13th Gen)"));
        assert_eq!(label("Intel Core i5 Processor").as_deref(), Some("Intel Core i5"));
    }

    #[test]
    fn intel_budget_and_ultra_lines() {
        assert_eq!(label("Intel Celeron N4020").as_deref(), Some("Intel Celeron"));
        assert_eq!(label("Intel Pentium Silver N5030").as_deref(), Some("Intel Pentium Silver"));
        assert_eq!(label("Intel Processor N100").as_deref(), Some("Intel N-Series"));
        assert_eq!(label("Intel Core Ultra 7 155H").as_deref(), Some("Intel Core Ultra 7"));
        assert_eq!(label("Core Ultra 7 (Series 1)").as_deref(), Some("Intel Core Ultra 7"));
        assert_eq!(label("Core Ultra 9 288V").as_deref(), Some("Intel Core Ultra 9 (Series 2)"));
        assert_eq!(label("Intel Core Ultra 5").as_deref(), Some("Intel Core Ultra 5"));
        assert_eq!(label("Intel Core Ultra Processor").as_deref(), Some("Intel Core Ultra"));
    }

    #[test]
    fn amd_lines() {
        assert_eq!(label("AMD Ryzen 7 7735HS").as_deref(), Some("AMD Ryzen 7 (7000 Series)"));
        assert_eq!(label("Ryzen 5 PRO 5650U").as_deref(), Some("AMD Ryzen 5 (5000 Series)"));
        assert_eq!(label("AMD Ryzen 7 (7000 Series)").as_deref(), Some("AMD Ryzen 7 (7000 Series)"));
        assert_eq!(label("AMD Ryzen AI 9 HX 370").as_deref(), Some("AMD Ryzen AI 9"));
        assert_eq!(label("AMD Ryzen 3 processor").as_deref(), Some("AMD Ryzen 3"));
        assert_eq!(label("AMD Athlon Silver 3050U").as_deref(), Some("AMD Athlon"));
    }

    #[test]
    fn apple_and_arm_lines() {
        assert_eq!(label("Apple M2 Pro").as_deref(), Some("Apple M2 Pro"));
        assert_eq!(label("M3 Max chip with 16-core CPU").as_deref(), Some("Apple M3 Max"));
        assert_eq!(label("2020 MacBook Air, M1, 8GB").as_deref(), Some("Apple M1"));
        assert_eq!(
            label("Snapdragon X Elite X1E-78-100").as_deref(),
            Some("Qualcomm Snapdragon X Elite")
        );
        assert_eq!(label("MediaTek Kompanio 520").as_deref(), Some("MediaTek Kompanio"));
    }

    #[test]
    fn every_canonical_label_parses_back_to_itself() {
        let labels = [
            "Intel Core Ultra",
            "Intel Core Ultra 7",
            "Intel Core Ultra 9 (Series 2)",
            "Intel Core i7 (13th Gen)",
            "Intel Core i5 (8th Gen)",
            "Intel Core i3",
            "Intel Core m3",
            "Intel Celeron",
            "Intel Pentium",
            "Intel Pentium Silver",
            "Intel Pentium Gold",
            "Intel N-Series",
            "Intel Atom",
            "Intel Xeon",
            "AMD Ryzen AI 9",
            "AMD Ryzen 7 (7000 Series)",
            "AMD Ryzen 3",
            "AMD Athlon",
            "AMD A-Series",
            "Apple M1",
            "Apple M3 Pro",
            "Apple M2 Max",
            "Qualcomm Snapdragon X Elite",
            "Qualcomm Snapdragon X Plus",
            "Qualcomm Snapdragon 8cx",
            "Qualcomm Snapdragon 7c",
            "MediaTek Kompanio",
            "MediaTek Processor",
        ];
        for expected in labels {
            assert_eq!(label(expected).as_deref(), Some(expected), "{}", expected);
        }
    }

    #[test]
    fn m2_ssd_is_not_apple_silicon() {
        assert_eq!(label("1TB M2 NVMe SSD"), None);
        assert_eq!(label("M.2 2280 slot"), None);
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(22), "22nd");
    }
}
