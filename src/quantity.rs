//! Quantity and unit extraction from product text
//!
//! Resolution walks through increasingly noisy text scopes: the product name
//! first, then whatever text the caller collected around the price (siblings,
//! the price's container, the whole card), returning the first match.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Unit families tried against the product name, in order
const NAME_PATTERNS: &[(&str, &str)] = &[
    ("millilitres", r"\d+(?:\.\d+)?\s*ml\b"),
    ("grams", r"\d+(?:\.\d+)?\s*(?:gms|gm|g)\b"),
    ("kilograms", r"\d+(?:\.\d+)?\s*kg\b"),
    ("litres", r"\d+(?:\.\d+)?\s*(?:litres|litre|ltr|l)\b"),
    ("pieces", r"\d+\s*(?:pieces|piece|pcs|pc)\b"),
    ("packs", r"\d+\s*(?:packs|pack)\b"),
    ("numbers", r"\d+\s*(?:nos|no)\b"),
    ("units", r"\d+\s*(?:units|unit)\b"),
    ("eggs", r"\d+\s*(?:eggs|egg)\b"),
];

/// Single catch-all pattern used for the noisier scopes around the price
const NEARBY_PATTERN: &str =
    r"\d+(?:\.\d+)?\s*(?:ml|kg|gms|gm|g|litres|litre|ltr|l|pieces|piece|pcs|packs|pack|nos|units|unit|eggs|egg)\b";

struct QuantityPattern {
    unit: &'static str,
    regex: Regex,
}

static NAME_QUANTITY_PATTERNS: LazyLock<Vec<QuantityPattern>> = LazyLock::new(|| {
    NAME_PATTERNS
        .iter()
        .filter_map(|(unit, pattern)| {
            Regex::new(&format!("(?i){pattern}"))
                .ok()
                .map(|regex| QuantityPattern { unit: *unit, regex })
        })
        .collect()
});

static NEARBY_QUANTITY_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(&format!("(?i){NEARBY_PATTERN}")).ok());

#[derive(Debug, Clone, Copy, Default)]
pub struct QuantityResolver;

impl QuantityResolver {
    pub fn new() -> Self {
        Self
    }

    /// Returns the first quantity token found, or an empty string.
    ///
    /// `nearby_text` must be ordered from most to least specific scope.
    pub fn resolve<S: AsRef<str>>(&self, product_name: &str, nearby_text: &[S]) -> String {
        if let Some(quantity) = Self::from_name(product_name) {
            return quantity;
        }

        nearby_text
            .iter()
            .find_map(|text| Self::from_nearby(text.as_ref()))
            .unwrap_or_default()
    }

    fn from_name(name: &str) -> Option<String> {
        NAME_QUANTITY_PATTERNS.iter().find_map(|pattern| {
            let found = pattern.regex.find(name)?;
            debug!("Quantity {} ({}) found in name", found.as_str(), pattern.unit);
            Some(found.as_str().trim().to_string())
        })
    }

    fn from_nearby(text: &str) -> Option<String> {
        NEARBY_QUANTITY_PATTERN
            .as_ref()?
            .find(text)
            .map(|m| m.as_str().trim().to_string())
    }
}
