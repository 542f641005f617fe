//! One browser page driven through the aggregator's search flow
//!
//! The session walks `Created → Navigated → LocationVerified → Searched →
//! Paginated → Done`. Every step carries its own timeout, and every other page
//! call is bounded by the interaction timeout. Only failing to enter the query
//! stops the flow; every other failure is logged and the session moves on
//! with whatever the page has loaded.

use std::future::Future;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::traits::BrowserPage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Navigated,
    LocationVerified,
    Searched,
    Paginated,
    Done,
}

async fn bounded<T>(
    limit: Duration,
    step: &str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    timeout(limit, call)
        .await
        .map_err(|_| anyhow!("{} timed out after {:?}", step, limit))?
}

pub struct PageSession<'a> {
    page: Box<dyn BrowserPage>,
    config: &'a ScraperConfig,
    state: SessionState,
}

impl<'a> PageSession<'a> {
    pub fn new(page: Box<dyn BrowserPage>, config: &'a ScraperConfig) -> Self {
        Self {
            page,
            config,
            state: SessionState::Created,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the whole flow and returns the final page HTML.
    ///
    /// # Returns
    /// * `Result<String>` - Page snapshot, or an error when no search input
    ///   could be found
    pub async fn load_results(&mut self, query: &str) -> Result<String> {
        self.navigate().await;
        self.verify_location().await;
        self.search(query).await?;
        self.paginate().await;
        self.snapshot().await
    }

    /// Opens the aggregator. A timeout or load error is not fatal: the page
    /// may still be usable.
    pub async fn navigate(&mut self) {
        let base_url = &self.config.base_url;
        info!("Navigating to {}", base_url);

        match timeout(self.config.timeouts.navigation, self.page.navigate(base_url)).await {
            Ok(Ok(())) => sleep(self.config.timeouts.settle).await,
            Ok(Err(e)) => warn!("Navigation to {} failed, attempting to continue: {}", base_url, e),
            Err(_) => warn!(
                "Page load timed out after {:?}, attempting to continue",
                self.config.timeouts.navigation
            ),
        }

        self.state = SessionState::Navigated;
    }

    /// Reads the delivery location the aggregator detected, for the logs only
    pub async fn verify_location(&mut self) -> Option<String> {
        let selector = &self.config.selectors.location_indicator;

        let location = match self.page.wait_for(selector, self.config.timeouts.location).await {
            Ok(()) => bounded(
                self.config.timeouts.interaction,
                "reading location",
                self.page.text_of(selector),
            )
            .await
            .ok()
            .flatten(),
            Err(e) => {
                debug!("Location indicator not visible: {}", e);
                None
            }
        };

        match &location {
            Some(text) => info!("Location detected: {}", text.trim()),
            None => warn!("Could not verify location detection"),
        }

        self.state = SessionState::LocationVerified;
        location
    }

    /// Types the query into the first search input found and submits it
    pub async fn search(&mut self, query: &str) -> Result<()> {
        info!("Searching for: {}", query);

        let timeouts = self.config.timeouts;
        let Some(input) = self
            .page
            .find_first_visible(&self.config.selectors.search_inputs, timeouts.search_input)
            .await
        else {
            bail!("Could not find search input field");
        };

        let limit = timeouts.interaction;
        let placeholder = self.page.attribute_of(&input, "placeholder");
        if let Ok(Some(placeholder)) = bounded(limit, "reading placeholder", placeholder).await {
            debug!("Using search input {} ({})", input, placeholder);
        }

        bounded(limit, "typing the query", self.page.fill(&input, query)).await?;
        bounded(limit, "submitting the query", self.page.press_enter(&input)).await?;

        let cards = &self.config.selectors.product_card;
        if let Err(e) = self.page.wait_for(cards, timeouts.results).await {
            warn!("No result cards appeared for '{}': {}", query, e);
        }
        sleep(timeouts.settle).await;

        self.state = SessionState::Searched;
        Ok(())
    }

    /// Scrolls until the document height stops growing or the attempt limit
    /// is hit.
    ///
    /// # Returns
    /// * `usize` - Number of scroll attempts made
    pub async fn paginate(&mut self) -> usize {
        info!("Scrolling to load more results...");

        let timeouts = self.config.timeouts;
        let mut previous_height = None;
        let mut attempts = 0;

        while attempts < timeouts.max_scroll_attempts {
            attempts += 1;

            let scroll = self.page.scroll_to_bottom_and_measure();
            let height = match bounded(timeouts.interaction, "scrolling", scroll).await {
                Ok(height) => height,
                Err(e) => {
                    warn!("Scroll attempt {} failed: {}", attempts, e);
                    break;
                }
            };

            if previous_height == Some(height) {
                info!("Reached end of scrollable content after {} attempts", attempts);
                break;
            }

            debug!("Document height {} after scroll attempt {}", height, attempts);
            previous_height = Some(height);
            sleep(timeouts.scroll_settle).await;
        }

        self.state = SessionState::Paginated;
        attempts
    }

    /// Serializes the loaded page for extraction
    pub async fn snapshot(&mut self) -> Result<String> {
        let interaction = self.config.timeouts.interaction;
        let count = self.page.count_matching(&self.config.selectors.product_card);
        match bounded(interaction, "counting cards", count).await {
            Ok(count) => info!("Found {} product cards", count),
            Err(e) => debug!("Could not count product cards: {}", e),
        }

        let html = bounded(interaction, "reading page HTML", self.page.content()).await?;
        self.state = SessionState::Done;
        Ok(html)
    }

    /// Releases the page and its browser
    pub async fn close(self) {
        let interaction = self.config.timeouts.interaction;
        if let Err(e) = bounded(interaction, "closing the browser", self.page.close()).await {
            warn!("Failed to close browser session: {}", e);
        }
    }
}
