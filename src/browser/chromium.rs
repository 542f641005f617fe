//! Chromium-backed browser pages using chromiumoxide

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{GrantPermissionsParams, PermissionType};
use chromiumoxide::cdp::browser_protocol::emulation::SetGeolocationOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::traits::{BrowserLauncher, BrowserPage};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launches one headless Chromium per session
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumLauncher;

impl ChromiumLauncher {
    pub fn new() -> Self {
        Self
    }

    fn browser_config(config: &ScraperConfig) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--lang=en-IN");

        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder
            .build()
            .map_err(|e| anyhow!("failed to build browser config: {e}"))
    }

    fn user_agent_override(config: &ScraperConfig) -> SetUserAgentOverrideParams {
        let mut params = SetUserAgentOverrideParams::new(config.user_agent.clone());
        params.accept_language = Some("en-IN,en;q=0.9".to_string());
        params
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, config: &ScraperConfig) -> Result<Box<dyn BrowserPage>> {
        let browser_config = Self::browser_config(config)?;

        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("failed to launch Chromium")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let mut permissions = GrantPermissionsParams::new(vec![PermissionType::Geolocation]);
        permissions.origin = Some(config.base_url.clone());
        if let Err(e) = browser.execute(permissions).await {
            warn!("Could not grant geolocation permission: {}", e);
        }

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                let _ = browser.close().await;
                return Err(anyhow!("failed to open page: {e}"));
            }
        };

        let geolocation = SetGeolocationOverrideParams::builder()
            .latitude(config.geolocation.latitude)
            .longitude(config.geolocation.longitude)
            .accuracy(100.0)
            .build();
        if let Err(e) = page.execute(geolocation).await {
            warn!("Could not override geolocation: {}", e);
        }
        if let Err(e) = page.set_user_agent(Self::user_agent_override(config)).await {
            warn!("Could not set user agent: {}", e);
        }

        info!("Chromium session started");

        Ok(Box::new(ChromiumPage {
            browser: Some(browser),
            page,
            handler_task,
        }))
    }
}

/// A single Chromium page owning its browser process
pub struct ChromiumPage {
    browser: Option<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl ChromiumPage {
    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T> {
        self.page
            .evaluate(script)
            .await
            .context("JS execution failed")?
            .into_value()
            .map_err(|e| anyhow!("failed to convert JS result: {e:?}"))
    }

    /// Evaluates an expression that may yield `null`, which CDP reports
    /// without a value, by round-tripping it through `JSON.stringify`
    async fn eval_nullable<T: DeserializeOwned>(&self, expression: String) -> Result<Option<T>> {
        let json: String = self.eval(format!("JSON.stringify({expression})")).await?;
        serde_json::from_str(&json).context("failed to decode JS result")
    }
}

/// JSON-quotes a selector for embedding in a script
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("navigation to {url} failed"))?;
        if let Err(e) = self.page.wait_for_navigation().await {
            debug!("Waiting for navigation to {} to settle failed: {}", url, e);
        }
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        let script = format!(
            "(() => {{ const e = document.querySelector({}); \
             return !!e && e.getClientRects().length > 0; }})()",
            js_string(selector)
        );
        let deadline = Instant::now() + timeout;

        loop {
            if self.eval::<bool>(script.clone()).await.unwrap_or(false) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                bail!("timed out after {:?} waiting for {}", timeout, selector);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("no element for {selector}"))?;

        let clear = format!(
            "(() => {{ const e = document.querySelector({}); if (e) {{ e.value = ''; }} return true; }})()",
            js_string(selector)
        );
        self.eval::<bool>(clear).await?;

        element.click().await.context("failed to focus input")?;
        element.type_str(value).await.context("failed to type query")?;
        Ok(())
    }

    async fn press_enter(&self, selector: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .with_context(|| format!("no element for {selector}"))?
            .press_key("Enter")
            .await
            .context("failed to press Enter")?;
        Ok(())
    }

    async fn scroll_to_bottom_and_measure(&self) -> Result<u64> {
        self.eval(
            "(() => { const h = document.body.scrollHeight; window.scrollTo(0, h); return h; })()"
                .to_string(),
        )
        .await
    }

    async fn count_matching(&self, selector: &str) -> Result<usize> {
        self.eval(format!(
            "document.querySelectorAll({}).length",
            js_string(selector)
        ))
        .await
    }

    async fn text_of(&self, selector: &str) -> Result<Option<String>> {
        self.eval_nullable(format!(
            "(() => {{ const e = document.querySelector({}); return e ? e.innerText : null; }})()",
            js_string(selector)
        ))
        .await
    }

    async fn attribute_of(&self, selector: &str, name: &str) -> Result<Option<String>> {
        self.eval_nullable(format!(
            "(() => {{ const e = document.querySelector({}); return e ? e.getAttribute({}) : null; }})()",
            js_string(selector),
            js_string(name)
        ))
        .await
    }

    async fn content(&self) -> Result<String> {
        self.page.content().await.context("failed to get page HTML")
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        if let Some(mut browser) = self.browser.take() {
            browser.close().await.context("failed to close browser")?;
            let _ = browser.wait().await;
        }
        self.handler_task.abort();
        debug!("Chromium session closed");
        Ok(())
    }
}

impl Drop for ChromiumPage {
    fn drop(&mut self) {
        // Browser's own Drop kills the child process
        self.handler_task.abort();
    }
}
