use crate::extract::processor::{CpuVendor, Processor};
use crate::model::GpuKind;
use regex::{Captures, Regex};
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuVendor {
    Nvidia,
    Amd,
    Intel,
    Apple,
    Qualcomm,
}

impl GpuVendor {
    pub fn from_name(text: &str) -> Option<Self> {
        let lower = text.trim().to_lowercase();
        match lower.as_str() {
            "nvidia" | "geforce" | "nvidia geforce" => Some(GpuVendor::Nvidia),
            "amd" | "radeon" | "amd radeon" => Some(GpuVendor::Amd),
            "intel" => Some(GpuVendor::Intel),
            "apple" => Some(GpuVendor::Apple),
            "qualcomm" | "adreno" => Some(GpuVendor::Qualcomm),
            _ => None,
        }
    }
}

/// A recognized graphics adapter.
///
/// `family` groups related parts (`nvidia-rtx-40`, `intel-iris`); `model`
/// pins a specific part (`rtx-4060`) and is absent for integrated graphics
/// without a model number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gpu {
    pub vendor: GpuVendor,
    pub kind: GpuKind,
    pub family: String,
    pub model: Option<String>,
    pub label: String,
}

impl Gpu {
    fn new(vendor: GpuVendor, kind: GpuKind, family: impl Into<String>, model: Option<String>, label: String) -> Self {
        Self {
            vendor,
            kind,
            family: family.into(),
            model,
            label,
        }
    }
}

type Rule = (LazyLock<Regex>, fn(&Captures<'_>) -> Option<Gpu>);

macro_rules! rule {
    ($re:expr, $f:expr) => {
        (LazyLock::new(|| Regex::new($re).unwrap()), $f)
    };
}

static RULES: [Rule; 13] = [
    // Workstation parts first so `RTX 2000 Ada` is not read as a GeForce.
    rule!(r"(?i)\brtx\s*(a\d{3,4}|\d{4}\s*ada)\b", |c| {
        let part = c[1].split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase().replace("ADA", "Ada");
        Some(Gpu::new(
            GpuVendor::Nvidia,
            GpuKind::Dedicated,
            "nvidia-rtx-pro",
            Some(format!("rtx-{}", part.to_lowercase().replace(' ', "-"))),
            format!("NVIDIA RTX {}", part),
        ))
    }),
    rule!(r"(?i)\b(?:nvidia\s*)?(?:geforce\s*)?(rtx|gtx)\s*(\d{3,4})\s*(ti|super)?\b", |c| {
        let line = c[1].to_uppercase();
        let number = &c[2];
        let suffix = c.get(3).map(|m| {
            if m.as_str().eq_ignore_ascii_case("ti") { "Ti" } else { "SUPER" }
        });
        let family = if line == "RTX" {
            format!("nvidia-rtx-{}", &number[..number.len() - 2])
        } else {
            "nvidia-gtx".to_string()
        };
        let mut label = format!("NVIDIA GeForce {} {}", line, number);
        let mut model = format!("{}-{}", line.to_lowercase(), number);
        if let Some(suffix) = suffix {
            label.push(' ');
            label.push_str(suffix);
            model.push('-');
            model.push_str(&suffix.to_lowercase());
        }
        Some(Gpu::new(GpuVendor::Nvidia, GpuKind::Dedicated, family, Some(model), label))
    }),
    rule!(r"(?i)\b(?:nvidia\s*)?(?:geforce\s*)?mx\s*(\d{3})\b", |c| {
        Some(Gpu::new(
            GpuVendor::Nvidia,
            GpuKind::Dedicated,
            "nvidia-mx",
            Some(format!("mx-{}", &c[1])),
            format!("NVIDIA GeForce MX{}", &c[1]),
        ))
    }),
    rule!(r"(?i)\b(?:amd\s*)?radeon\s*rx\s*(\d{4})\s*([a-z]{0,2})\b", |c| {
        let part = format!("{}{}", &c[1], c[2].to_uppercase());
        Some(Gpu::new(
            GpuVendor::Amd,
            GpuKind::Dedicated,
            "amd-radeon-rx",
            Some(format!("rx-{}", part.to_lowercase())),
            format!("AMD Radeon RX {}", part),
        ))
    }),
    rule!(r"(?i)\b(?:amd\s*)?radeon\s*pro\s*(\d{3,4}[a-z]?)\b", |c| {
        let part = c[1].to_uppercase();
        Some(Gpu::new(
            GpuVendor::Amd,
            GpuKind::Dedicated,
            "amd-radeon-pro",
            Some(format!("radeon-pro-{}", part.to_lowercase())),
            format!("AMD Radeon Pro {}", part),
        ))
    }),
    rule!(r"(?i)\b(?:amd\s*)?radeon\s*(\d{3})m\b", |c| {
        Some(Gpu::new(
            GpuVendor::Amd,
            GpuKind::Integrated,
            "amd-radeon",
            Some(format!("radeon-{}m", &c[1])),
            format!("AMD Radeon {}M", &c[1]),
        ))
    }),
    rule!(r"(?i)\b(?:amd\s*)?radeon\s*(?:vega\s*\d*\s*)?(?:graphics|gpu)\b|\bradeon\s*vega\b", |_| {
        Some(Gpu::new(
            GpuVendor::Amd,
            GpuKind::Integrated,
            "amd-radeon",
            None,
            "AMD Radeon Graphics".to_string(),
        ))
    }),
    rule!(r"(?i)\b(?:intel\s*)?arc\s*(a\d{3}m)\b", |c| {
        let part = c[1].to_uppercase();
        Some(Gpu::new(
            GpuVendor::Intel,
            GpuKind::Dedicated,
            "intel-arc",
            Some(format!("arc-{}", part.to_lowercase())),
            format!("Intel Arc {}", part),
        ))
    }),
    rule!(r"(?i)\bintel\s*arc\b|\barc\s*(?:graphics|gpu|1[34]0v)\b", |_| {
        Some(Gpu::new(
            GpuVendor::Intel,
            GpuKind::Integrated,
            "intel-arc",
            None,
            "Intel Arc Graphics".to_string(),
        ))
    }),
    rule!(r"(?i)\biris\s*(xe|plus)\b", |c| {
        let tier = if c[1].eq_ignore_ascii_case("xe") { "Xe" } else { "Plus" };
        Some(Gpu::new(
            GpuVendor::Intel,
            GpuKind::Integrated,
            "intel-iris",
            Some(format!("iris-{}", tier.to_lowercase())),
            format!("Intel Iris {} Graphics", tier),
        ))
    }),
    rule!(r"(?i)\bintel\s*u?hd\b|\bu?hd\s*graphics\b", |c| {
        let part = if c[0].to_lowercase().contains("uhd") { "UHD" } else { "HD" };
        Some(Gpu::new(
            GpuVendor::Intel,
            GpuKind::Integrated,
            "intel-uhd",
            Some(part.to_lowercase()),
            format!("Intel {} Graphics", part),
        ))
    }),
    rule!(r"(?i)\badreno\b", |_| {
        Some(Gpu::new(
            GpuVendor::Qualcomm,
            GpuKind::Integrated,
            "qualcomm-adreno",
            None,
            "Qualcomm Adreno".to_string(),
        ))
    }),
    rule!(r"(?i)\bapple\s*(m[1-4](?:\s*(?:pro|max|ultra))?)\s*gpu\b", |c| {
        let chip = c[1].to_uppercase().replace("PRO", "Pro").replace("MAX", "Max").replace("ULTRA", "Ultra");
        Some(apple_gpu(&chip))
    }),
];

/// Recognizes a graphics adapter in free text.
pub fn parse(text: &str) -> Option<Gpu> {
    RULES
        .iter()
        .find_map(|(re, build)| re.captures(text).and_then(|c| build(&c)))
}

/// Apple silicon graphics, one model per chip (`M3 Pro` → `apple-m3-pro`).
fn apple_gpu(chip: &str) -> Gpu {
    let chip = chip.split_whitespace().collect::<Vec<_>>().join(" ");
    Gpu::new(
        GpuVendor::Apple,
        GpuKind::Integrated,
        "apple",
        Some(format!("apple-{}", chip.to_lowercase().replace(' ', "-"))),
        format!("Apple {} GPU", chip),
    )
}

/// Integrated graphics implied by a system-on-chip processor.
pub fn infer_from_processor(cpu: &Processor) -> Option<Gpu> {
    match cpu.vendor {
        CpuVendor::Apple => Some(apple_gpu(&cpu.family)),
        CpuVendor::Qualcomm if cpu.family.starts_with("Snapdragon X") => Some(Gpu::new(
            GpuVendor::Qualcomm,
            GpuKind::Integrated,
            "qualcomm-adreno",
            None,
            "Qualcomm Adreno".to_string(),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::processor;

    fn label(text: &str) -> Option<String> {
        parse(text).map(|g| g.label)
    }

    #[test]
    fn nvidia_parts() {
        let gpu = parse("NVIDIA GeForce RTX 4060 Laptop GPU").unwrap();
        assert_eq!(gpu.label, "NVIDIA GeForce RTX 4060");
        assert_eq!(gpu.family, "nvidia-rtx-40");
        assert_eq!(gpu.model.as_deref(), Some("rtx-4060"));
        assert_eq!(gpu.kind, GpuKind::Dedicated);

        assert_eq!(label("RTX 3070 Ti").as_deref(), Some("NVIDIA GeForce RTX 3070 Ti"));
        assert_eq!(label("GTX 1650").as_deref(), Some("NVIDIA GeForce GTX 1650"));
        assert_eq!(label("GeForce MX550").as_deref(), Some("NVIDIA GeForce MX550"));
        assert_eq!(label("NVIDIA RTX 2000 Ada").as_deref(), Some("NVIDIA RTX 2000 Ada"));
        assert_eq!(label("NVIDIA RTX A2000").as_deref(), Some("NVIDIA RTX A2000"));
    }

    #[test]
    fn amd_and_intel_parts() {
        assert_eq!(label("AMD Radeon RX 7600S").as_deref(), Some("AMD Radeon RX 7600S"));
        assert_eq!(parse("Radeon 780M").unwrap().kind, GpuKind::Integrated);
        assert_eq!(label("AMD Radeon Graphics").as_deref(), Some("AMD Radeon Graphics"));
        assert_eq!(label("Intel Iris Xe Graphics").as_deref(), Some("Intel Iris Xe Graphics"));
        assert_eq!(label("Intel UHD Graphics 620").as_deref(), Some("Intel UHD Graphics"));
        assert_eq!(label("Intel Arc A370M").as_deref(), Some("Intel Arc A370M"));
        assert_eq!(parse("Intel Arc Graphics").unwrap().kind, GpuKind::Integrated);
    }

    #[test]
    fn integrated_parts_carry_their_own_model() {
        assert_eq!(parse("Intel Iris Xe Graphics").unwrap().model.as_deref(), Some("iris-xe"));
        assert_eq!(parse("Iris Plus Graphics 655").unwrap().model.as_deref(), Some("iris-plus"));
        assert_eq!(parse("Intel UHD Graphics 620").unwrap().model.as_deref(), Some("uhd"));
        assert_eq!(parse("Intel HD Graphics 520").unwrap().model.as_deref(), Some("hd"));
        let m2 = parse("Apple M2 Max GPU").unwrap();
        assert_eq!(m2.model.as_deref(), Some("apple-m2-max"));
        assert_eq!(m2.label, "Apple M2 Max GPU");
        assert_eq!(parse("AMD Radeon Graphics").unwrap().model, None);
    }

    #[test]
    fn display_uhd_is_not_a_gpu() {
        assert_eq!(label("15.6\" 4K UHD Display"), None);
        assert_eq!(label("FHD IPS Screen, HD Webcam"), None);
    }

    #[test]
    fn soc_processors_imply_integrated_graphics() {
        let cpu = processor::parse("Apple M2 Max").unwrap();
        assert_eq!(infer_from_processor(&cpu).unwrap().label, "Apple M2 Max GPU");
        let cpu = processor::parse("Snapdragon X Plus").unwrap();
        assert_eq!(infer_from_processor(&cpu).unwrap().label, "Qualcomm Adreno");
        let cpu = processor::parse("Intel Core i5-1235U").unwrap();
        assert!(infer_from_processor(&cpu).is_none());
    }
}
