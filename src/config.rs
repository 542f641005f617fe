//! Scraper configuration: aggregator URL, selectors and wait budgets

use std::time::Duration;

use tracing::info;

/// Configuration for the price-aggregator scraper
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Aggregator landing page
    pub base_url: String,
    /// Run the browser without a window
    pub headless: bool,
    /// Explicit Chromium binary, otherwise auto-detected
    pub chrome_path: Option<String>,
    pub user_agent: String,
    /// Location the storefronts should quote prices for
    pub geolocation: Geolocation,
    pub selectors: SiteSelectors,
    pub timeouts: Timeouts,
}

/// Coordinates reported to the aggregator through the geolocation API
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geolocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// CSS selectors for the parts of the aggregator page we touch
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    /// Element showing the detected delivery location
    pub location_indicator: String,
    /// Search input candidates, tried in order
    pub search_inputs: Vec<String>,
    /// Result card; its appearance also marks the search as complete
    pub product_card: String,
    /// Brand line within a card
    pub brand: String,
    /// Product name within a card
    pub name: String,
    /// Bold price span within a card
    pub price: String,
    /// Row around a price that also holds the storefront logo
    pub platform_container: String,
    /// Storefront logo within the platform row
    pub platform_logo: String,
}

/// Wait budgets for every browser step
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub navigation: Duration,
    pub location: Duration,
    /// Per-candidate wait while looking for the search input
    pub search_input: Duration,
    /// Wait for the first result card after submitting the query
    pub results: Duration,
    /// Fixed pause after navigation and after the results appear
    pub settle: Duration,
    /// Pause after each scroll before measuring the page again
    pub scroll_settle: Duration,
    /// Upper bound for any single page interaction (typing, reading text,
    /// scrolling, serializing the DOM)
    pub interaction: Duration,
    pub max_scroll_attempts: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://quickcompare.in".to_string(),
            headless: true,
            chrome_path: None,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
            geolocation: Geolocation {
                latitude: 13.021_200_18,
                longitude: 77.570_396_42,
            },
            selectors: SiteSelectors::default(),
            timeouts: Timeouts::default(),
        }
    }
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            location_indicator: "div.truncate".to_string(),
            search_inputs: vec![
                r#"input[type="text"]"#.to_string(),
                r#"input[placeholder*="compare prices"]"#.to_string(),
                r#"input[placeholder*="search"]"#.to_string(),
            ],
            product_card: "div.flex.flex-col.gap-2.rounded-md.bg-white".to_string(),
            brand: ".line-clamp-1".to_string(),
            name: ".line-clamp-2".to_string(),
            price: "span.text-m.font-bold".to_string(),
            platform_container: "div.flex.w-full.items-center".to_string(),
            platform_logo: "img".to_string(),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(60),
            location: Duration::from_secs(10),
            search_input: Duration::from_secs(5),
            results: Duration::from_secs(15),
            settle: Duration::from_secs(2),
            scroll_settle: Duration::from_millis(1500),
            interaction: Duration::from_secs(10),
            max_scroll_attempts: 5,
        }
    }
}

#[cfg(test)]
impl Timeouts {
    /// Near-zero waits so scripted pages run instantly
    pub fn immediate() -> Self {
        Self {
            navigation: Duration::from_millis(200),
            location: Duration::ZERO,
            search_input: Duration::ZERO,
            results: Duration::ZERO,
            settle: Duration::ZERO,
            scroll_settle: Duration::ZERO,
            interaction: Duration::from_millis(200),
            max_scroll_attempts: 5,
        }
    }
}

impl ScraperConfig {
    /// Default configuration with deployment overrides from the environment.
    ///
    /// ## Environment Variables
    ///
    /// - `QUICKCOMPARE_BASE_URL`: aggregator URL
    /// - `QUICKCOMPARE_HEADLESS`: `false`/`0` to show the browser window
    /// - `QUICKCOMPARE_CHROME_PATH`: Chromium executable
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("QUICKCOMPARE_BASE_URL") {
            info!("Using aggregator URL from environment: {}", base_url);
            config.base_url = base_url;
        }

        if let Ok(headless) = std::env::var("QUICKCOMPARE_HEADLESS") {
            config.headless = !matches!(headless.trim().to_lowercase().as_str(), "false" | "0" | "no");
        }

        config.chrome_path = std::env::var("QUICKCOMPARE_CHROME_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty());

        config
    }
}
