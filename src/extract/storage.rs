use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

pub const MIN_DRIVE_GB: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveKind {
    Ssd,
    Hdd,
    Emmc,
    Ufs,
    Hybrid,
}

impl DriveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriveKind::Ssd => "SSD",
            DriveKind::Hdd => "HDD",
            DriveKind::Emmc => "eMMC",
            DriveKind::Ufs => "UFS",
            DriveKind::Hybrid => "Hybrid",
        }
    }

    /// Classifies the words around a size, e.g. `PCIe NVMe SSD` or `Hard Drive`.
    pub fn classify(words: &str) -> Option<Self> {
        let lower = words.to_lowercase();
        if lower.contains("hybrid") {
            Some(DriveKind::Hybrid)
        } else if lower.contains("emmc") {
            Some(DriveKind::Emmc)
        } else if lower.contains("ufs") {
            Some(DriveKind::Ufs)
        } else if lower.contains("hdd") || lower.contains("hard") || lower.contains("rpm") {
            Some(DriveKind::Hdd)
        } else if ["ssd", "solid", "nvme", "pcie", "m.2", "flash"]
            .iter()
            .any(|w| lower.contains(w))
        {
            Some(DriveKind::Ssd)
        } else {
            None
        }
    }
}

impl fmt::Display for DriveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drive {
    /// Capacity in GB, with terabytes counted as 1024.
    pub size_gb: u32,
    pub kind: Option<DriveKind>,
}

impl Drive {
    pub fn label(&self) -> String {
        match self.kind {
            Some(kind) => format!("{} {}", size_label(self.size_gb), kind),
            None => size_label(self.size_gb),
        }
    }
}

/// `1024` → `1TB`, `512` → `512GB`.
pub fn size_label(size_gb: u32) -> String {
    if size_gb >= 1024 && size_gb % 1024 == 0 {
        format!("{}TB", size_gb / 1024)
    } else {
        format!("{}GB", size_gb)
    }
}

/// Converts a captured number and unit to GB; `1000GB` and `1TB` both
/// become 1024.
pub fn to_gb(number: &str, unit: &str) -> Option<u32> {
    let value: f64 = number.parse().ok()?;
    let gb = if unit.eq_ignore_ascii_case("tb") {
        (value * 1024.0).round() as u32
    } else {
        value.round() as u32
    };
    let gb = if gb >= 1000 && gb % 1000 == 0 { gb / 1000 * 1024 } else { gb };
    (gb >= MIN_DRIVE_GB).then_some(gb)
}

static SIZE_THEN_KIND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,4}(?:\.\d)?)\s*(gb|tb)\b\s*((?:(?:pcie|nvme|m\.2|sata|gen\s*\d|x\d|solid\s+state(?:\s+drive)?|hard\s+(?:disk\s+)?drive|ssd|hdd|emmc|ufs|storage|flash|drive|\d{4}\s*rpm)[\s/-]*){1,5})",
    )
    .unwrap()
});
static KIND_THEN_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(ssd|hdd|emmc|ufs|storage|hard\s*drive)\s*[:\-]?\s*(\d{1,4}(?:\.\d)?)\s*(gb|tb)\b")
        .unwrap()
});
static SECOND_DRIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:\+|and|&|,|/|with)\s*(\d{1,4}(?:\.\d)?)\s*(gb|tb)\s*(ssd|hdd|hard\s*drive|nvme)")
        .unwrap()
});
static PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3})\s*gb?\s*[/|+]\s*(\d{1,4})\s*(gb?|tb)\b").unwrap()
});
static BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,4}(?:\.\d)?)\s*(gb|tb)\b").unwrap());

/// Recognizes the primary drive in free text.
pub fn parse(text: &str) -> Option<Drive> {
    for caps in SIZE_THEN_KIND_RE.captures_iter(text) {
        let Some(size_gb) = to_gb(&caps[1], &caps[2]) else {
            continue;
        };
        let mut kind = DriveKind::classify(&caps[3]);
        let rest = &text[caps.get(0).map_or(0, |m| m.end())..];
        if let (Some(first), Some(second)) = (kind, SECOND_DRIVE_RE.captures(rest)) {
            if DriveKind::classify(&second[3]).is_some_and(|k| k != first) {
                kind = Some(DriveKind::Hybrid);
            }
        }
        return Some(Drive { size_gb, kind });
    }
    for caps in KIND_THEN_SIZE_RE.captures_iter(text) {
        if let Some(size_gb) = to_gb(&caps[2], &caps[3]) {
            return Some(Drive {
                size_gb,
                kind: DriveKind::classify(&caps[1]),
            });
        }
    }
    for caps in PAIR_RE.captures_iter(text) {
        let unit = if caps[3].eq_ignore_ascii_case("tb") { "tb" } else { "gb" };
        let first: u32 = caps[1].parse().unwrap_or(0);
        if first > 128 {
            continue;
        }
        if let Some(size_gb) = to_gb(&caps[2], unit) {
            return Some(Drive { size_gb, kind: None });
        }
    }
    None
}

/// Lenient variant for a product-details value already known to be storage.
pub fn parse_detail(text: &str) -> Option<Drive> {
    parse(text).or_else(|| {
        let caps = BARE_RE.captures(text)?;
        Some(Drive {
            size_gb: to_gb(&caps[1], &caps[2])?,
            kind: DriveKind::classify(text),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(text: &str) -> Option<String> {
        parse(text).map(|d| d.label())
    }

    #[test]
    fn recognizes_drive_types() {
        assert_eq!(label("16GB RAM, 512GB SSD").as_deref(), Some("512GB SSD"));
        assert_eq!(label("2TB PCIe NVMe M.2 SSD").as_deref(), Some("2TB SSD"));
        assert_eq!(label("1TB HDD").as_deref(), Some("1TB HDD"));
        assert_eq!(label("64GB eMMC").as_deref(), Some("64GB eMMC"));
        assert_eq!(label("128GB UFS Storage").as_deref(), Some("128GB UFS"));
        assert_eq!(label("1TB 5400 RPM Hard Drive").as_deref(), Some("1TB HDD"));
    }

    #[test]
    fn normalizes_decimal_terabytes() {
        assert_eq!(label("1000GB SSD").as_deref(), Some("1TB SSD"));
        assert_eq!(label("1024GB SSD").as_deref(), Some("1TB SSD"));
        assert_eq!(label("2000GB NVMe").as_deref(), Some("2TB SSD"));
    }

    #[test]
    fn two_drives_of_different_kinds_are_hybrid() {
        assert_eq!(label("1TB SSD + 1TB HDD").as_deref(), Some("1TB Hybrid"));
        assert_eq!(label("512GB SSD + 512GB SSD").as_deref(), Some("512GB SSD"));
    }

    #[test]
    fn size_after_keyword_and_slash_pairs() {
        assert_eq!(label("Storage: 1TB").as_deref(), Some("1TB"));
        assert_eq!(label("SSD 256GB").as_deref(), Some("256GB SSD"));
        assert_eq!(label("16GB/512GB").as_deref(), Some("512GB"));
    }

    #[test]
    fn memory_sized_values_are_rejected() {
        assert_eq!(label("16GB RAM"), None);
        assert_eq!(label("16GB storage"), None);
    }

    #[test]
    fn detail_values_need_no_marker() {
        assert_eq!(parse_detail("1 TB").map(|d| d.label()).as_deref(), Some("1TB"));
        assert_eq!(parse_detail("512 GB").map(|d| d.size_gb), Some(512));
    }
}
