use crate::filter::FilterField;
use crate::filter::category::{
    BrandCategory, Category, ConditionCategory, GraphicsCategory, OsCategory, ProcessorCategory,
    RamCategory, ScreenCategory, StorageCategory,
};
use crate::utils::{normalize_ws, tokens};
use std::collections::HashSet;

/// Shortest stored value allowed to match as a substring of the filter.
const MIN_REVERSE_MATCH_LEN: usize = 3;

/// Whether a stored attribute satisfies one filter value.
///
/// Both sides are mapped to the field's canonical category first; only when
/// either side has none does the comparison fall back to text heuristics.
/// A missing stored value never matches.
pub fn value_matches(field: FilterField, stored: Option<&str>, filter: &str, token_overlap: f64) -> bool {
    let filter = filter.trim();
    if filter.is_empty() {
        return true;
    }
    let Some(stored) = stored.map(str::trim).filter(|s| !s.is_empty()) else {
        return false;
    };
    let by_category = match field {
        FilterField::Brand => compare::<BrandCategory>(stored, filter),
        FilterField::Model => None,
        FilterField::Processor => compare::<ProcessorCategory>(stored, filter),
        FilterField::Ram => compare::<RamCategory>(stored, filter),
        FilterField::Storage => compare::<StorageCategory>(stored, filter),
        FilterField::Graphics => compare::<GraphicsCategory>(stored, filter),
        FilterField::ScreenSize => compare::<ScreenCategory>(stored, filter),
        FilterField::OperatingSystem => compare::<OsCategory>(stored, filter),
        FilterField::Condition => compare::<ConditionCategory>(stored, filter),
    };
    by_category.unwrap_or_else(|| text_matches(stored, filter, token_overlap))
}

fn compare<C: Category>(stored: &str, filter: &str) -> Option<bool> {
    let filter = C::categorize(filter)?;
    let stored = C::categorize(stored)?;
    Some(filter.covers(&stored))
}

fn normalize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '.' { c } else { ' ' })
        .collect();
    normalize_ws(&cleaned.to_lowercase())
}

/// Substring containment either way, then token overlap.
pub fn text_matches(stored: &str, filter: &str, token_overlap: f64) -> bool {
    let stored_norm = normalize(stored);
    let filter_norm = normalize(filter);
    if filter_norm.is_empty() {
        return true;
    }
    if stored_norm.contains(&filter_norm) {
        return true;
    }
    if stored_norm.len() >= MIN_REVERSE_MATCH_LEN && filter_norm.contains(&stored_norm) {
        return true;
    }

    let wanted = tokens(filter);
    if wanted.is_empty() {
        return false;
    }
    let have: HashSet<String> = tokens(stored).into_iter().collect();
    let hits = wanted.iter().filter(|t| have.contains(*t)).count();
    hits as f64 / wanted.len() as f64 >= token_overlap
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVERLAP: f64 = 2.0 / 3.0;

    #[test]
    fn missing_stored_value_never_matches() {
        assert!(!value_matches(FilterField::Ram, None, "16GB", OVERLAP));
        assert!(!value_matches(FilterField::Model, Some("  "), "XPS", OVERLAP));
    }

    #[test]
    fn empty_filter_value_matches_anything() {
        assert!(value_matches(FilterField::Brand, Some("Dell"), " ", OVERLAP));
    }

    #[test]
    fn categories_decide_before_text() {
        // Four of five tokens overlap, but the generations differ.
        assert!(!value_matches(
            FilterField::Processor,
            Some("Intel Core i7 (12th Gen)"),
            "Intel Core i7 (13th Gen)",
            OVERLAP
        ));
        assert!(value_matches(FilterField::Brand, Some("HP"), "Hewlett-Packard", OVERLAP));
        assert!(value_matches(FilterField::Storage, Some("1TB SSD"), "1000GB", OVERLAP));
    }

    #[test]
    fn named_parts_and_families_are_not_widened() {
        let cases = [
            (FilterField::Graphics, "Intel Iris Xe Graphics", "Intel Iris Plus Graphics"),
            (FilterField::Graphics, "Intel UHD Graphics", "Intel HD Graphics"),
            (FilterField::Processor, "AMD Ryzen 7 (7000 Series)", "AMD A-Series"),
            (FilterField::Processor, "Intel Core i7 (13th Gen)", "Intel Core Ultra"),
            (FilterField::Storage, "1TB SSD", "512GB SSD"),
        ];
        for (field, stored, filter) in cases {
            assert!(!value_matches(field, Some(stored), filter, OVERLAP), "{} vs {}", filter, stored);
        }
        assert!(value_matches(FilterField::Storage, Some("1TB SSD"), "M.2 SSD", OVERLAP));
        assert!(value_matches(FilterField::Storage, Some("1TB SSD"), "PCIe 4.0 SSD", OVERLAP));
        assert!(value_matches(FilterField::Processor, Some("Intel Core Ultra 7"), "Intel Core Ultra", OVERLAP));
    }

    #[test]
    fn falls_back_to_text_without_a_category() {
        assert!(value_matches(FilterField::Model, Some("ThinkPad X1 Carbon Gen 11"), "x1 carbon", OVERLAP));
        assert!(value_matches(FilterField::Model, Some("Envy x360"), "HP Envy x360", OVERLAP));
        assert!(!value_matches(FilterField::Model, Some("Pavilion 15"), "Envy x360", OVERLAP));
        assert!(value_matches(FilterField::Brand, Some("Tecno"), "tecno", OVERLAP));
    }

    #[test]
    fn token_overlap_threshold() {
        assert!(text_matches("ROG Strix G16", "strix g16 scar", OVERLAP));
        assert!(!text_matches("ROG Strix G16", "strix scar 18", OVERLAP));
        assert!(text_matches("ROG Strix G16", "strix scar 18", 0.3));
    }
}
