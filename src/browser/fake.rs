//! Scripted browser used by unit tests

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::config::ScraperConfig;
use crate::traits::{BrowserLauncher, BrowserPage};

/// What a fake page saw happen to it
#[derive(Debug, Default)]
pub struct FakeLog {
    pub navigations: AtomicUsize,
    pub filled: Mutex<Vec<(String, String)>>,
    pub enters: AtomicUsize,
    pub scrolls: AtomicUsize,
    pub closed: AtomicBool,
    pub dropped: AtomicBool,
}

/// Page serving a fixed HTML snapshot with scripted behaviour
#[derive(Clone)]
pub struct FakePage {
    html: String,
    visible: HashSet<String>,
    heights: Arc<Mutex<VecDeque<u64>>>,
    navigation_delay: Duration,
    interaction_delay: Duration,
    pub log: Arc<FakeLog>,
}

impl FakePage {
    pub fn new(html: &str) -> Self {
        Self {
            html: html.to_string(),
            visible: HashSet::new(),
            heights: Arc::new(Mutex::new(VecDeque::from([1000]))),
            navigation_delay: Duration::ZERO,
            interaction_delay: Duration::ZERO,
            log: Arc::new(FakeLog::default()),
        }
    }

    /// Selectors that `wait_for` reports as visible
    pub fn with_visible(mut self, selectors: &[&str]) -> Self {
        self.visible.extend(selectors.iter().map(ToString::to_string));
        self
    }

    /// Document heights returned by successive scrolls; the last one repeats
    pub fn with_heights(self, heights: &[u64]) -> Self {
        *self.heights.lock().expect("heights lock") = heights.iter().copied().collect();
        self
    }

    pub fn with_navigation_delay(mut self, delay: Duration) -> Self {
        self.navigation_delay = delay;
        self
    }

    /// Delay applied to typing, reading text and serializing the page
    pub fn with_interaction_delay(mut self, delay: Duration) -> Self {
        self.interaction_delay = delay;
        self
    }

    fn first_match<T>(&self, selector: &str, read: impl Fn(scraper::ElementRef) -> T) -> Result<Option<T>> {
        let parsed = Selector::parse(selector).map_err(|e| anyhow!("bad selector {selector}: {e:?}"))?;
        let document = Html::parse_document(&self.html);
        Ok(document.select(&parsed).next().map(read))
    }
}

impl Drop for FakePage {
    fn drop(&mut self) {
        self.log.dropped.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn navigate(&self, _url: &str) -> Result<()> {
        tokio::time::sleep(self.navigation_delay).await;
        self.log.navigations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        if self.visible.contains(selector) {
            Ok(())
        } else {
            bail!("timed out after {:?} waiting for {}", timeout, selector)
        }
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        tokio::time::sleep(self.interaction_delay).await;
        self.log
            .filled
            .lock()
            .expect("fill log lock")
            .push((selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn press_enter(&self, _selector: &str) -> Result<()> {
        tokio::time::sleep(self.interaction_delay).await;
        self.log.enters.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn scroll_to_bottom_and_measure(&self) -> Result<u64> {
        self.log.scrolls.fetch_add(1, Ordering::SeqCst);
        let mut heights = self.heights.lock().expect("heights lock");
        let height = if heights.len() > 1 {
            heights.pop_front()
        } else {
            heights.front().copied()
        };
        height.ok_or_else(|| anyhow!("no height scripted"))
    }

    async fn count_matching(&self, selector: &str) -> Result<usize> {
        let parsed = Selector::parse(selector).map_err(|e| anyhow!("bad selector {selector}: {e:?}"))?;
        let document = Html::parse_document(&self.html);
        Ok(document.select(&parsed).count())
    }

    async fn text_of(&self, selector: &str) -> Result<Option<String>> {
        tokio::time::sleep(self.interaction_delay).await;
        self.first_match(selector, |el| el.text().collect::<String>())
    }

    async fn attribute_of(&self, selector: &str, name: &str) -> Result<Option<String>> {
        Ok(self
            .first_match(selector, |el| el.value().attr(name).map(ToString::to_string))?
            .flatten())
    }

    async fn content(&self) -> Result<String> {
        tokio::time::sleep(self.interaction_delay).await;
        Ok(self.html.clone())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.log.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out clones of one scripted page, or fails like a missing browser
pub struct FakeLauncher {
    page: Option<FakePage>,
    pub launches: AtomicUsize,
}

impl FakeLauncher {
    pub fn serving(page: FakePage) -> Self {
        Self {
            page: Some(page),
            launches: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            page: None,
            launches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self, _config: &ScraperConfig) -> Result<Box<dyn BrowserPage>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        match &self.page {
            Some(page) => Ok(Box::new(page.clone())),
            None => bail!("browser automation not available"),
        }
    }
}
