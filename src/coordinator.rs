use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::browser::ChromiumLauncher;
use crate::config::ScraperConfig;
use crate::extractor::ProductExtractor;
use crate::fallback::FallbackDataProvider;
use crate::models::{ResultSource, SearchResult};
use crate::session::PageSession;
use crate::traits::BrowserLauncher;

pub const DEFAULT_MAX_CARDS: usize = 5;
pub const MAX_CARDS_LIMIT: usize = 20;

/// Runs one independent browser session per search and turns the loaded page
/// into products
#[derive(Clone)]
pub struct ScrapeCoordinator {
    config: Arc<ScraperConfig>,
    launcher: Arc<dyn BrowserLauncher>,
    extractor: Arc<ProductExtractor>,
    fallback: FallbackDataProvider,
}

impl ScrapeCoordinator {
    /// Coordinator driving a local Chromium
    pub fn new(config: ScraperConfig) -> Result<Self> {
        Self::with_launcher(config, Arc::new(ChromiumLauncher::new()))
    }

    pub fn with_launcher(config: ScraperConfig, launcher: Arc<dyn BrowserLauncher>) -> Result<Self> {
        let extractor = ProductExtractor::new(&config.selectors)?;

        Ok(Self {
            config: Arc::new(config),
            launcher,
            extractor: Arc::new(extractor),
            fallback: FallbackDataProvider::new(),
        })
    }

    /// Searches the aggregator for `query`, returning at most `max_cards`
    /// products (clamped to 1..=20).
    ///
    /// Browser failures never surface as errors: a missing search box yields
    /// an empty result and an unavailable browser yields the fallback catalog.
    /// The browser session is closed on every path, and dropping the returned
    /// future releases it as well.
    ///
    /// # Returns
    /// * `Result<SearchResult>` - Error only for an empty query
    pub async fn search(&self, query: &str, max_cards: usize) -> Result<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            bail!("Query cannot be empty");
        }

        let max_cards = max_cards.clamp(1, MAX_CARDS_LIMIT);
        info!("Starting scrape for query: '{}' with max_cards: {}", query, max_cards);

        let page = match self.launcher.launch(&self.config).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Browser automation unavailable, returning fallback data: {:#}", e);
                let products = self.fallback.generate(query, max_cards);
                return Ok(SearchResult::new(query, products, ResultSource::Fallback));
            }
        };

        let mut session = PageSession::new(page, &self.config);
        let loaded = session.load_results(query).await;
        session.close().await;

        let products = match loaded {
            Ok(html) => self.extractor.extract_html(&html, max_cards),
            Err(e) => {
                warn!("Search failed for '{}': {:#}", query, e);
                Vec::new()
            }
        };

        if products.is_empty() {
            warn!("No products found for query: '{}'", query);
        } else {
            info!("Successfully scraped {} products for '{}'", products.len(), query);
        }

        Ok(SearchResult::new(query, products, ResultSource::Live))
    }

    /// Checks that a browser session can be started and closed
    pub async fn browser_available(&self) -> bool {
        match self.launcher.launch(&self.config).await {
            Ok(page) => {
                if let Err(e) = page.close().await {
                    warn!("Failed to close probe session: {}", e);
                }
                true
            }
            Err(e) => {
                warn!("Browser automation unavailable: {:#}", e);
                false
            }
        }
    }
}
