//! Canonical categories used to compare stored values with filter values.
//!
//! Both sides are categorized with the same function; the filter side then
//! decides whether it *covers* the stored side at its own granularity.

use crate::extract::graphics::{self, GpuVendor};
use crate::extract::processor::{self, CpuVendor};
use crate::extract::storage::{self, DriveKind};
use crate::extract::{brand, misc};
use crate::model::{Condition, GpuKind};
use regex::Regex;
use std::sync::LazyLock;

pub trait Category: Sized {
    fn categorize(value: &str) -> Option<Self>;

    /// Whether `self`, taken from a filter value, includes `stored`.
    fn covers(&self, stored: &Self) -> bool;
}

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(tb|gb)?").unwrap());
static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(tb|gb)\b").unwrap());
static SIZE_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(tb|gb)?\s*(?:-|to)\s*(\d+(?:\.\d+)?)\s*(tb|gb)\b").unwrap()
});
static IRIS_FAMILY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:intel\s*)?iris(?:\s*graphics)?\s*$").unwrap());
static RTX_SERIES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\brtx\s*(\d{2})\s*-?\s*series\b").unwrap());

const SIZE_TOLERANCE: f64 = 0.05;

/// A numeric filter value: `16GB`, `64GB+`, `Under 13"`, `15-15.9"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Range {
    Exact(f64),
    AtLeast(f64),
    AtMost(f64),
    Below(f64),
    Between(f64, f64),
}

impl Range {
    pub fn contains(&self, value: f64) -> bool {
        match *self {
            Range::Exact(x) => (value - x).abs() < SIZE_TOLERANCE,
            Range::AtLeast(x) => value >= x - SIZE_TOLERANCE,
            Range::AtMost(x) => value <= x + SIZE_TOLERANCE,
            Range::Below(x) => value < x,
            Range::Between(lo, hi) => value >= lo - SIZE_TOLERANCE && value <= hi + SIZE_TOLERANCE,
        }
    }

    /// Parses a numeric phrase; `scale` converts a number and its unit.
    pub fn parse(text: &str, scale: impl Fn(f64, Option<&str>) -> f64) -> Option<Self> {
        let lower = text.to_lowercase();
        let numbers: Vec<(f64, Option<String>)> = NUMBER_RE
            .captures_iter(&lower)
            .filter_map(|c| {
                let n: f64 = c[1].parse().ok()?;
                Some((n, c.get(2).map(|m| m.as_str().to_string())))
            })
            .collect();
        let (first, first_unit) = numbers.first()?.clone();

        if numbers.len() >= 2 && (lower.contains('-') || lower.contains(" to ")) {
            let (second, second_unit) = numbers[1].clone();
            let first_unit = first_unit.or_else(|| second_unit.clone());
            return Some(Range::Between(
                scale(first, first_unit.as_deref()),
                scale(second, second_unit.as_deref()),
            ));
        }
        Some(Self::bounded(&lower, scale(first, first_unit.as_deref())))
    }

    /// Like [`Range::parse`], but only numbers carrying a `gb`/`tb` unit are
    /// sizes, so `M.2` and `PCIe 4.0` are ignored. A unitless lower end
    /// takes the upper end's unit when it stays below it (`1-2TB`), else GB
    /// (`512-1TB`).
    pub fn parse_sized(text: &str, scale: impl Fn(f64, Option<&str>) -> f64) -> Option<Self> {
        let lower = text.to_lowercase();
        if let Some(c) = SIZE_SPAN_RE.captures(&lower) {
            let low: f64 = c[1].parse().ok()?;
            let high: f64 = c[3].parse().ok()?;
            let low_unit = match c.get(2) {
                Some(unit) => unit.as_str(),
                None if low < high => &c[4],
                None => "gb",
            };
            return Some(Range::Between(scale(low, Some(low_unit)), scale(high, Some(&c[4]))));
        }
        let c = SIZE_RE.captures(&lower)?;
        let value: f64 = c[1].parse().ok()?;
        Some(Self::bounded(&lower, scale(value, Some(&c[2]))))
    }

    fn bounded(lower: &str, value: f64) -> Self {
        let at_least = ["+", "or more", "and above", "and up", "& up", "over", "above", "at least"];
        let at_most = ["or less", "up to", "& under", "and under", "max"];
        let below = ["under", "below", "less than", "<"];
        if at_least.iter().any(|w| lower.contains(w)) {
            Range::AtLeast(value)
        } else if at_most.iter().any(|w| lower.contains(w)) {
            Range::AtMost(value)
        } else if below.iter().any(|w| lower.contains(w)) {
            Range::Below(value)
        } else {
            Range::Exact(value)
        }
    }

    fn covers(&self, stored: &Range) -> bool {
        match stored {
            Range::Exact(v) => self.contains(*v),
            other => self == other,
        }
    }
}

fn gigabytes(value: f64, unit: Option<&str>) -> f64 {
    match unit {
        Some("tb") => value * 1024.0,
        _ => value,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrandCategory(pub String);

impl Category for BrandCategory {
    fn categorize(value: &str) -> Option<Self> {
        brand::canonical_brand(value).map(BrandCategory)
    }

    fn covers(&self, stored: &Self) -> bool {
        self.0 == stored.0
    }
}

/// Tierless families that take in their tiers: `Core Ultra` covers
/// `Core Ultra 7`, `Pentium` covers `Pentium Silver`.
const UMBRELLA_FAMILIES: [&str; 2] = ["Core Ultra", "Pentium"];

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorCategory {
    pub vendor: CpuVendor,
    pub family: Option<String>,
    pub qualifier: Option<String>,
}

impl Category for ProcessorCategory {
    fn categorize(value: &str) -> Option<Self> {
        if let Some(cpu) = processor::parse(value) {
            return Some(Self {
                vendor: cpu.vendor,
                family: Some(cpu.family),
                qualifier: cpu.qualifier,
            });
        }
        CpuVendor::from_name(value).map(|vendor| Self {
            vendor,
            family: None,
            qualifier: None,
        })
    }

    fn covers(&self, stored: &Self) -> bool {
        let same = |a: &Option<String>, b: &Option<String>| match (a, b) {
            (None, _) => true,
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (Some(_), None) => false,
        };
        let family_ok = match (&self.family, &stored.family) {
            (Some(want), Some(have)) if UMBRELLA_FAMILIES.contains(&want.as_str()) => {
                have.eq_ignore_ascii_case(want)
                    || have
                        .to_lowercase()
                        .starts_with(&format!("{} ", want.to_lowercase()))
            }
            (want, have) => same(want, have),
        };
        self.vendor == stored.vendor && family_ok && same(&self.qualifier, &stored.qualifier)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RamCategory(pub Range);

impl Category for RamCategory {
    fn categorize(value: &str) -> Option<Self> {
        Range::parse_sized(value, gigabytes).map(RamCategory)
    }

    fn covers(&self, stored: &Self) -> bool {
        self.0.covers(&stored.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageCategory {
    pub size: Option<Range>,
    pub kind: Option<DriveKind>,
}

impl Category for StorageCategory {
    fn categorize(value: &str) -> Option<Self> {
        let size = Range::parse_sized(value, |n, unit| {
            let gb = gigabytes(n, unit);
            // Same 1000 → 1024 folding as extraction.
            let gb = gb.round() as u32;
            storage::to_gb(&gb.to_string(), "gb").map_or(gb as f64, |g| g as f64)
        });
        let kind = DriveKind::classify(value);
        if size.is_none() && kind.is_none() {
            return None;
        }
        Some(Self { size, kind })
    }

    fn covers(&self, stored: &Self) -> bool {
        let size_ok = match (&self.size, &stored.size) {
            (None, _) => true,
            (Some(filter), Some(stored)) => filter.covers(stored),
            (Some(_), None) => false,
        };
        let kind_ok = match (self.kind, stored.kind) {
            (None, _) => true,
            (Some(want), Some(DriveKind::Hybrid)) => {
                matches!(want, DriveKind::Ssd | DriveKind::Hdd | DriveKind::Hybrid)
            }
            (Some(want), Some(have)) => want == have,
            (Some(_), None) => false,
        };
        size_ok && kind_ok
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsCategory {
    pub vendor: Option<GpuVendor>,
    pub kind: Option<GpuKind>,
    pub family: Option<String>,
    pub model: Option<String>,
}

impl Category for GraphicsCategory {
    fn categorize(value: &str) -> Option<Self> {
        if let Some(gpu) = graphics::parse(value) {
            return Some(Self {
                vendor: Some(gpu.vendor),
                kind: Some(gpu.kind),
                family: Some(gpu.family),
                model: gpu.model,
            });
        }
        if IRIS_FAMILY_RE.is_match(value) {
            return Some(Self {
                vendor: Some(GpuVendor::Intel),
                kind: Some(GpuKind::Integrated),
                family: Some("intel-iris".to_string()),
                model: None,
            });
        }
        if let Some(c) = RTX_SERIES_RE.captures(value) {
            return Some(Self {
                vendor: Some(GpuVendor::Nvidia),
                kind: Some(GpuKind::Dedicated),
                family: Some(format!("nvidia-rtx-{}", &c[1])),
                model: None,
            });
        }
        let lower = value.trim().to_lowercase();
        let kind = if lower.contains("dedicated") || lower.contains("discrete") {
            Some(GpuKind::Dedicated)
        } else if lower.contains("integrated") || lower.contains("onboard") || lower.contains("shared") {
            Some(GpuKind::Integrated)
        } else {
            None
        };
        let vendor = GpuVendor::from_name(&lower);
        if kind.is_none() && vendor.is_none() {
            return None;
        }
        Some(Self {
            vendor,
            kind,
            family: None,
            model: None,
        })
    }

    fn covers(&self, stored: &Self) -> bool {
        fn same<T: PartialEq>(want: &Option<T>, have: &Option<T>) -> bool {
            want.is_none() || want == have
        }
        // A family-level filter covers both discrete and integrated parts.
        let kind_ok = self.family.is_some() || same(&self.kind, &stored.kind);
        same(&self.vendor, &stored.vendor)
            && same(&self.family, &stored.family)
            && same(&self.model, &stored.model)
            && kind_ok
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenCategory {
    pub range: Range,
    /// Written without decimals, e.g. `15 inch`.
    pub whole_inch: bool,
}

impl Category for ScreenCategory {
    fn categorize(value: &str) -> Option<Self> {
        let range = Range::parse(value, |n, _| n)?;
        let whole_inch = matches!(range, Range::Exact(_)) && !value.contains('.');
        Some(Self { range, whole_inch })
    }

    fn covers(&self, stored: &Self) -> bool {
        // A whole-inch filter covers the whole inch: `15 inch` takes 15.6.
        let filter = match self.range {
            Range::Exact(x) if self.whole_inch => Range::Between(x, x + 0.9),
            other => other,
        };
        filter.covers(&stored.range)
    }
}

/// Operating systems compare by token prefix: `Windows` covers
/// `Windows 11 Home`.
#[derive(Debug, Clone, PartialEq)]
pub struct OsCategory(pub Vec<String>);

impl Category for OsCategory {
    fn categorize(value: &str) -> Option<Self> {
        let name = misc::operating_system(value).or_else(|| {
            let lower = value.trim().to_lowercase();
            match lower.as_str() {
                "windows" => Some("Windows".to_string()),
                "mac" | "macos" | "mac os" => Some("macOS".to_string()),
                _ => None,
            }
        })?;
        Some(OsCategory(
            name.to_lowercase().split_whitespace().map(str::to_string).collect(),
        ))
    }

    fn covers(&self, stored: &Self) -> bool {
        stored.0.starts_with(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionCategory(pub Condition);

impl Category for ConditionCategory {
    fn categorize(value: &str) -> Option<Self> {
        let lower = value.trim().to_lowercase();
        match lower.as_str() {
            "new" | "brand new" => Some(ConditionCategory(Condition::New)),
            _ => match misc::condition(&lower) {
                Condition::New => None,
                other => Some(ConditionCategory(other)),
            },
        }
    }

    fn covers(&self, stored: &Self) -> bool {
        self.0 == stored.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covers<C: Category>(filter: &str, stored: &str) -> bool {
        let f = C::categorize(filter).expect("filter categorizes");
        let s = C::categorize(stored).expect("stored categorizes");
        f.covers(&s)
    }

    #[test]
    fn numeric_ranges() {
        assert_eq!(Range::parse("16GB", gigabytes), Some(Range::Exact(16.0)));
        assert_eq!(Range::parse("64GB+", gigabytes), Some(Range::AtLeast(64.0)));
        assert_eq!(Range::parse("8GB or less", gigabytes), Some(Range::AtMost(8.0)));
        assert_eq!(Range::parse("512GB-1TB", gigabytes), Some(Range::Between(512.0, 1024.0)));
        assert_eq!(Range::parse("Under 13\"", gigabytes), Some(Range::Below(13.0)));
        assert_eq!(Range::parse("no digits", gigabytes), None);
    }

    #[test]
    fn processor_hierarchy() {
        assert!(covers::<ProcessorCategory>("Intel Core i7", "Intel Core i7 (13th Gen)"));
        assert!(covers::<ProcessorCategory>("Intel", "Intel Celeron"));
        assert!(covers::<ProcessorCategory>("Apple M-Series", "Apple M3 Pro"));
        assert!(!covers::<ProcessorCategory>("Intel Core i7 (13th Gen)", "Intel Core i7 (12th Gen)"));
        assert!(!covers::<ProcessorCategory>("Intel Core i7", "Intel Core i5 (13th Gen)"));
        assert!(!covers::<ProcessorCategory>("AMD Ryzen 7", "Intel Core i7"));
    }

    #[test]
    fn processor_family_filters_stay_within_their_family() {
        assert!(covers::<ProcessorCategory>("AMD A-Series", "AMD A-Series"));
        assert!(covers::<ProcessorCategory>("AMD A-Series", "AMD A9-9425"));
        assert!(!covers::<ProcessorCategory>("AMD A-Series", "AMD Ryzen 7 (7000 Series)"));
        assert!(!covers::<ProcessorCategory>("AMD A-Series", "AMD Athlon"));

        assert!(covers::<ProcessorCategory>("Intel Core Ultra", "Intel Core Ultra 7"));
        assert!(covers::<ProcessorCategory>("Intel Core Ultra", "Intel Core Ultra 9 (Series 2)"));
        assert!(!covers::<ProcessorCategory>("Intel Core Ultra", "Intel Core i7 (13th Gen)"));
        assert!(!covers::<ProcessorCategory>("Intel Core Ultra 7", "Intel Core Ultra 5"));

        assert!(covers::<ProcessorCategory>("Intel Pentium", "Intel Pentium Silver"));
        assert!(!covers::<ProcessorCategory>("Intel Pentium Gold", "Intel Pentium Silver"));
    }

    #[test]
    fn ram_buckets() {
        assert!(covers::<RamCategory>("16GB", "16GB"));
        assert!(covers::<RamCategory>("16 gb", "16GB"));
        assert!(covers::<RamCategory>("64GB+", "96GB"));
        assert!(!covers::<RamCategory>("32GB", "16GB"));
        assert!(covers::<RamCategory>("8-16GB", "12GB"));
    }

    #[test]
    fn storage_size_and_kind() {
        assert!(covers::<StorageCategory>("1TB", "1TB SSD"));
        assert!(covers::<StorageCategory>("1000GB", "1TB SSD"));
        assert!(covers::<StorageCategory>("SSD", "512GB SSD"));
        assert!(covers::<StorageCategory>("SSD", "1TB Hybrid"));
        assert!(!covers::<StorageCategory>("SSD", "1TB HDD"));
        assert!(covers::<StorageCategory>("1TB+", "2TB SSD"));
        assert!(!covers::<StorageCategory>("512GB SSD", "512GB eMMC"));
    }

    #[test]
    fn interface_numbers_are_not_drive_sizes() {
        assert!(covers::<StorageCategory>("M.2 SSD", "1TB SSD"));
        assert!(covers::<StorageCategory>("PCIe 4.0 SSD", "1TB SSD"));
        assert!(covers::<StorageCategory>("M.2 NVMe 2TB", "2TB SSD"));
        assert!(!covers::<StorageCategory>("M.2 NVMe 2TB", "1TB SSD"));
        assert!(covers::<StorageCategory>("512-1TB", "1TB SSD"));
        assert_eq!(Range::parse_sized("PCIe 4.0", gigabytes), None);
        assert_eq!(Range::parse_sized("256 to 512GB", gigabytes), Some(Range::Between(256.0, 512.0)));
        assert_eq!(Range::parse_sized("1TB+", gigabytes), Some(Range::AtLeast(1024.0)));
        assert_eq!(Range::parse_sized("1-2TB", gigabytes), Some(Range::Between(1024.0, 2048.0)));
        assert!(covers::<RamCategory>("DDR5 16GB", "16GB"));
    }

    #[test]
    fn graphics_levels() {
        assert!(covers::<GraphicsCategory>("NVIDIA GeForce RTX 4060", "NVIDIA GeForce RTX 4060"));
        assert!(!covers::<GraphicsCategory>("RTX 4060", "NVIDIA GeForce RTX 4070"));
        assert!(covers::<GraphicsCategory>("RTX 40 Series", "NVIDIA GeForce RTX 4070"));
        assert!(covers::<GraphicsCategory>("Dedicated", "AMD Radeon RX 7600S"));
        assert!(!covers::<GraphicsCategory>("Dedicated", "Intel Iris Xe Graphics"));
        assert!(covers::<GraphicsCategory>("Integrated", "Apple M2 GPU"));
        assert!(covers::<GraphicsCategory>("NVIDIA", "NVIDIA GeForce MX550"));
        assert!(covers::<GraphicsCategory>("Intel Arc", "Intel Arc A370M"));
    }

    #[test]
    fn integrated_parts_are_told_apart() {
        assert!(!covers::<GraphicsCategory>("Intel Iris Plus Graphics", "Intel Iris Xe Graphics"));
        assert!(covers::<GraphicsCategory>("Intel Iris Xe", "Intel Iris Xe Graphics"));
        assert!(!covers::<GraphicsCategory>("Intel HD Graphics", "Intel UHD Graphics"));
        assert!(!covers::<GraphicsCategory>("Intel UHD Graphics", "Intel HD Graphics"));
        assert!(covers::<GraphicsCategory>("Intel Iris", "Intel Iris Plus Graphics"));
        assert!(covers::<GraphicsCategory>("Intel Iris", "Intel Iris Xe Graphics"));
        assert!(!covers::<GraphicsCategory>("Intel Iris", "Intel UHD Graphics"));
        assert!(!covers::<GraphicsCategory>("Apple M3 Pro GPU", "Apple M1 GPU"));
        assert!(covers::<GraphicsCategory>("Apple", "Apple M1 GPU"));
    }

    #[test]
    fn screen_bands() {
        assert!(covers::<ScreenCategory>("15-15.9\"", "15.6\""));
        assert!(covers::<ScreenCategory>("15 inch", "15.6\""));
        assert!(!covers::<ScreenCategory>("15.6 inch", "16\""));
        assert!(covers::<ScreenCategory>("Under 13\"", "11.6\""));
        assert!(covers::<ScreenCategory>("17\"+", "17.3\""));
        assert!(covers::<ScreenCategory>("16\"", "16\""));
    }

    #[test]
    fn os_prefixes_and_conditions() {
        assert!(covers::<OsCategory>("Windows", "Windows 11 Home"));
        assert!(covers::<OsCategory>("Windows 11", "Windows 11 Pro"));
        assert!(!covers::<OsCategory>("Windows 11 Pro", "Windows 11 Home"));
        assert!(covers::<OsCategory>("Chrome OS", "ChromeOS"));
        assert!(covers::<ConditionCategory>("Refurbished", "Renewed"));
        assert!(covers::<ConditionCategory>("New", "New"));
    }
}
