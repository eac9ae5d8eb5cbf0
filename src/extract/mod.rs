//! Title → specification extraction.
//!
//! Every attribute has an ordered list of patterns. Sources are searched in
//! a fixed order (title, product details, bullet points, description) and
//! the first source that yields a value wins.

pub mod brand;
pub mod display;
pub mod graphics;
pub mod memory;
pub mod misc;
pub mod processor;
pub mod storage;

use crate::model::{LaptopSpecs, SpecSource, SpecValue};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static TRADEMARK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[®™©]").unwrap());

/// Text available for a single listing.
#[derive(Debug, Clone, Copy)]
pub struct ExtractInput<'a> {
    pub title: &'a str,
    pub details: &'a BTreeMap<String, String>,
    pub bullet_points: &'a [String],
    pub description: &'a str,
}

/// Removes trademark glyphs and collapses whitespace.
pub fn clean_text(text: &str) -> String {
    crate::utils::normalize_ws(&TRADEMARK_RE.replace_all(text, " "))
}

struct Sources {
    title: String,
    details: Vec<(String, String)>,
    bullets: Vec<String>,
    description: String,
}

impl Sources {
    fn new(input: &ExtractInput<'_>) -> Self {
        Self {
            title: clean_text(input.title),
            details: input
                .details
                .iter()
                .map(|(k, v)| (k.to_lowercase(), clean_text(v)))
                .collect(),
            bullets: input.bullet_points.iter().map(|b| clean_text(b)).collect(),
            description: clean_text(&crate::utils::html_to_text(input.description)),
        }
    }

    /// Runs `strict` on the title, `lenient` on detail entries whose key
    /// contains one of `keys`, then `strict` on bullets and description.
    fn first<T>(
        &self,
        keys: &[&str],
        strict: impl Fn(&str) -> Option<T>,
        lenient: impl Fn(&str) -> Option<T>,
    ) -> Option<(T, SpecSource)> {
        if let Some(v) = strict(&self.title) {
            return Some((v, SpecSource::Title));
        }
        for (key, value) in &self.details {
            if keys.iter().any(|k| key.contains(k)) {
                if let Some(v) = lenient(value) {
                    return Some((v, SpecSource::Details));
                }
            }
        }
        for bullet in &self.bullets {
            if let Some(v) = strict(bullet) {
                return Some((v, SpecSource::Description));
            }
        }
        if !self.description.is_empty() {
            if let Some(v) = strict(&self.description) {
                return Some((v, SpecSource::Description));
            }
        }
        None
    }

    fn detail(&self, keys: &[&str]) -> Option<&str> {
        self.details
            .iter()
            .find(|(key, _)| keys.iter().any(|k| key.contains(k)))
            .map(|(_, v)| v.as_str())
    }

    fn all_text(&self) -> String {
        let mut text = self.title.clone();
        for bullet in &self.bullets {
            text.push_str(" | ");
            text.push_str(bullet);
        }
        text.push_str(" | ");
        text.push_str(&self.description);
        text
    }
}

/// Extracts the normalized specification of a listing.
pub fn extract_specs(input: &ExtractInput<'_>) -> LaptopSpecs {
    let src = Sources::new(input);
    let mut specs = LaptopSpecs::default();

    let processor = src.first(&["processor", "cpu"], processor::parse, processor::parse);
    if let Some((cpu, source)) = &processor {
        specs.processor = Some(SpecValue::new(cpu.label(), *source));
    }

    if let Some((mem, source)) = src.first(&["ram", "memory"], memory::parse, memory::parse_detail) {
        specs.ram = Some(SpecValue::new(mem.label(), source));
        specs.ram_type = mem.kind.or_else(|| memory::parse_kind(&src.all_text()));
    }

    if let Some((drive, source)) = src.first(
        &["hard drive", "storage", "hard disk", "ssd", "flash memory size"],
        storage::parse,
        storage::parse_detail,
    ) {
        specs.storage = Some(SpecValue::new(drive.label(), source));
    }

    let gpu = src
        .first(&["graphics", "card description", "gpu"], graphics::parse, graphics::parse)
        .or_else(|| {
            let (cpu, _) = processor.as_ref()?;
            graphics::infer_from_processor(cpu).map(|g| (g, SpecSource::Inferred))
        });
    if let Some((gpu, source)) = gpu {
        specs.gpu_kind = Some(gpu.kind);
        specs.graphics = Some(SpecValue::new(gpu.label, source));
    }

    if let Some((size, source)) = src.first(
        &["screen size", "display size", "standing screen"],
        display::screen_size,
        display::screen_size_detail,
    ) {
        specs.screen_size = Some(SpecValue::new(display::screen_label(size), source));
    }
    specs.resolution = src
        .first(&["resolution"], display::resolution, display::resolution)
        .map(|(r, _)| r);
    specs.refresh_rate_hz = src
        .first(&["refresh rate"], display::refresh_rate, display::refresh_rate)
        .map(|(r, _)| r);
    specs.touchscreen = display::touchscreen(&src.title)
        .or_else(|| src.detail(&["special feature", "display"]).and_then(display::touchscreen))
        .unwrap_or(false);

    let brand = brand::parse_brand(&src.title)
        .map(|b| (b, SpecSource::Title))
        .or_else(|| {
            src.detail(&["brand", "manufacturer"])
                .and_then(brand::canonical_brand)
                .map(|b| (b, SpecSource::Details))
        });
    if let Some((name, source)) = brand {
        specs.brand = Some(SpecValue::new(name, source));
    }
    let model = brand::parse_model(&src.title).map(|m| (m, SpecSource::Title)).or_else(|| {
        src.detail(&["series", "model name"])
            .and_then(brand::parse_model)
            .map(|m| (m, SpecSource::Details))
    });
    if let Some((name, source)) = model {
        specs.model = Some(SpecValue::new(name, source));
    }

    specs.operating_system = src
        .first(&["operating system"], misc::operating_system, misc::operating_system)
        .map(|(os, _)| os)
        .or_else(|| misc::infer_os(specs.brand_label(), specs.model_label(), &src.title));
    specs.condition = Some(misc::condition(&src.title));

    specs
}

/// Convenience wrapper for a bare title.
pub fn extract_from_title(title: &str) -> LaptopSpecs {
    let details = BTreeMap::new();
    extract_specs(&ExtractInput {
        title,
        details: &details,
        bullet_points: &[],
        description: "",
    })
}
