//! Browser capability interfaces used by the scraping session

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::config::ScraperConfig;

/// Starts browser sessions. Each call yields a page nobody else uses.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a browser and open one page configured for the aggregator.
    ///
    /// # Returns
    /// * `Result<Box<dyn BrowserPage>>` - The page, or an error when browser
    ///   automation is not available in this environment
    async fn launch(&self, config: &ScraperConfig) -> Result<Box<dyn BrowserPage>>;
}

/// The small set of page operations the scraper needs.
///
/// Dropping the page must release the underlying browser; `close` is the
/// graceful path.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Load a URL and wait for the load event
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait until an element matching `selector` is visible
    ///
    /// # Returns
    /// * `Result<()>` - Error if it does not show up within `timeout`
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Replace the value of the matched input with `value`
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    /// Press Enter on the matched element
    async fn press_enter(&self, selector: &str) -> Result<()>;

    /// Scroll to the bottom of the document
    ///
    /// # Returns
    /// * `Result<u64>` - Document height measured before scrolling
    async fn scroll_to_bottom_and_measure(&self) -> Result<u64>;

    /// Number of elements matching `selector`
    async fn count_matching(&self, selector: &str) -> Result<usize>;

    /// Rendered text of the first element matching `selector`
    async fn text_of(&self, selector: &str) -> Result<Option<String>>;

    /// Attribute value of the first element matching `selector`
    async fn attribute_of(&self, selector: &str, name: &str) -> Result<Option<String>>;

    /// Serialized DOM of the whole page
    async fn content(&self) -> Result<String>;

    /// Close the page and its browser
    async fn close(self: Box<Self>) -> Result<()>;

    /// First selector whose element becomes visible, each tried with its own
    /// `timeout`
    ///
    /// # Returns
    /// * `Option<String>` - The winning selector, `None` if none appeared
    async fn find_first_visible(&self, selectors: &[String], timeout: Duration) -> Option<String> {
        for selector in selectors {
            match self.wait_for(selector, timeout).await {
                Ok(()) => return Some(selector.clone()),
                Err(e) => debug!("Selector {} not visible: {}", selector, e),
            }
        }
        None
    }
}
