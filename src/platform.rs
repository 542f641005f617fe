//! Storefront name resolution from logo images

use std::sync::LazyLock;

use regex::Regex;

pub const UNKNOWN_PLATFORM: &str = "Unknown Platform";

/// Ordered (pattern, canonical name) pairs. First match wins, so entries whose
/// tokens occur inside other storefront identifiers must come first.
const PLATFORM_TABLE: &[(&str, &str)] = &[
    (r"instamart|swiggy", "Swiggy Instamart"),
    (r"zepto", "Zepto"),
    (r"bbnow|bigbasket", "BigBasket"),
    (r"blinkit|grofers", "Blinkit"),
    (r"flipkart", "Flipkart"),
    (r"amazon", "Amazon"),
    (r"myntra", "Myntra"),
    (r"jiomart|jio", "JioMart"),
    (r"dmart|avenue", "DMart"),
    (r"paytm", "Paytm Mall"),
];

static PLATFORM_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    PLATFORM_TABLE
        .iter()
        .filter_map(|(pattern, name)| {
            Regex::new(&format!("(?i){pattern}"))
                .ok()
                .map(|regex| (regex, *name))
        })
        .collect()
});

/// Maps a platform logo (`src` and `alt`) to a canonical storefront name
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformResolver;

impl PlatformResolver {
    pub fn new() -> Self {
        Self
    }

    /// Never fails and never returns an empty string
    pub fn resolve(&self, image_src: Option<&str>, alt_text: Option<&str>) -> String {
        let image_src = image_src.map(str::trim).filter(|s| !s.is_empty());
        let alt_text = alt_text.map(str::trim).filter(|s| !s.is_empty());

        if image_src.is_none() && alt_text.is_none() {
            return UNKNOWN_PLATFORM.to_string();
        }

        let haystack = format!("{} {}", image_src.unwrap_or(""), alt_text.unwrap_or(""));

        if let Some((_, name)) = PLATFORM_PATTERNS
            .iter()
            .find(|(regex, _)| regex.is_match(&haystack))
        {
            return (*name).to_string();
        }

        let fallback = match (image_src, alt_text) {
            (Some(src), _) => title_case(&url_basename(src).replace('_', " ")),
            (None, Some(alt)) => title_case(alt),
            (None, None) => String::new(),
        };

        if fallback.is_empty() {
            UNKNOWN_PLATFORM.to_string()
        } else {
            fallback
        }
    }
}

/// File name of a URL without query, fragment or extension
fn url_basename(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    file.split('.').next().unwrap_or(file)
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_storefronts_case_insensitively() {
        let resolver = PlatformResolver::new();

        assert_eq!(
            resolver.resolve(Some("https://cdn/x/Blinkit_logo.png"), None),
            "Blinkit"
        );
        assert_eq!(
            resolver.resolve(Some("https://cdn/x/logo.png"), Some("ZEPTO")),
            "Zepto"
        );
        assert_eq!(
            resolver.resolve(None, Some("Swiggy Instamart")),
            "Swiggy Instamart"
        );
        assert_eq!(
            resolver.resolve(Some("https://cdn/bbnow.svg"), None),
            "BigBasket"
        );
    }

    #[test]
    fn table_order_breaks_ties() {
        let resolver = PlatformResolver::new();
        // Earlier table rows win when one logo carries several storefront tokens
        assert_eq!(
            resolver.resolve(Some("https://cdn/zepto_jiomart.png"), None),
            "Zepto"
        );
        assert_eq!(resolver.resolve(Some("https://cdn/jio.png"), None), "JioMart");
    }

    #[test]
    fn unknown_logo_falls_back_to_title_cased_basename() {
        let resolver = PlatformResolver::new();

        assert_eq!(
            resolver.resolve(Some("https://cdn/x/fresh_MART_logo.png?v=2"), None),
            "Fresh Mart Logo"
        );
        assert_eq!(resolver.resolve(None, Some("country delight")), "Country Delight");
    }

    #[test]
    fn missing_inputs_resolve_to_unknown() {
        let resolver = PlatformResolver::new();

        assert_eq!(resolver.resolve(None, None), UNKNOWN_PLATFORM);
        assert_eq!(resolver.resolve(Some("  "), Some("")), UNKNOWN_PLATFORM);
        assert_eq!(resolver.resolve(Some("https://cdn/x/"), None), UNKNOWN_PLATFORM);
    }
}
