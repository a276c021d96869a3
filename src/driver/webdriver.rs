//! WebDriver-backed browser session
//!
//! Talks W3C WebDriver via thirtyfour: a locally running chromedriver in
//! local mode, or any remote endpoint (Selenium Grid, cloud providers) in
//! remote mode.

use anyhow::{Context, Result};
use async_trait::async_trait;
use thirtyfour::common::capabilities::desiredcapabilities::Capabilities;
use thirtyfour::prelude::*;

use crate::runner::locator::{Locator, Strategy};

use super::traits::BrowserSession;

/// Default local chromedriver endpoint
pub const DEFAULT_LOCAL_ENDPOINT: &str = "http://localhost:9515";

/// Session acquisition mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Local,
    Remote,
}

/// Session acquisition options
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub mode: SessionMode,
    pub headless: bool,
    /// Local chromedriver endpoint
    pub webdriver_url: String,
    /// Remote grid endpoint; required in remote mode
    pub remote_url: Option<String>,
    /// Remote capability hints
    pub browser: Option<String>,
    pub browser_version: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: SessionMode::Local,
            headless: false,
            webdriver_url: DEFAULT_LOCAL_ENDPOINT.to_string(),
            remote_url: None,
            browser: None,
            browser_version: None,
        }
    }
}

/// Browser session over a thirtyfour WebDriver client
pub struct WebDriverSession {
    driver: WebDriver,
    label: String,
}

impl WebDriverSession {
    /// Connect according to the session config.
    pub async fn connect(config: &SessionConfig) -> Result<Self> {
        match config.mode {
            SessionMode::Local => Self::connect_local(config).await,
            SessionMode::Remote => Self::connect_remote(config).await,
        }
    }

    async fn connect_local(config: &SessionConfig) -> Result<Self> {
        let caps = local_chrome_capabilities(config.headless)?;
        let driver = WebDriver::new(&config.webdriver_url, caps)
            .await
            .with_context(|| {
                format!(
                    "failed to start local session via {} (is chromedriver running?)",
                    config.webdriver_url
                )
            })?;

        Ok(Self {
            driver,
            label: format!("local chrome (headless={})", config.headless),
        })
    }

    async fn connect_remote(config: &SessionConfig) -> Result<Self> {
        let remote_url = config
            .remote_url
            .as_deref()
            .context("remote mode requested but no remote URL configured")?;

        let browser = config.browser.as_deref().unwrap_or("chrome");
        let caps = remote_capabilities(browser, config.browser_version.as_deref())?;
        let driver = WebDriver::new(remote_url, caps)
            .await
            .with_context(|| format!("failed to connect to remote session at {}", remote_url))?;

        Ok(Self {
            driver,
            label: format!("remote {} browser={}", remote_url, browser),
        })
    }

    async fn find(&self, locator: &Locator) -> WebDriverResult<WebElement> {
        self.driver.find(to_by(locator)).await
    }
}

fn to_by(locator: &Locator) -> By {
    match locator.strategy {
        Strategy::Css => By::Css(locator.value.clone()),
        Strategy::Xpath => By::XPath(locator.value.clone()),
    }
}

fn local_chrome_capabilities(headless: bool) -> Result<Capabilities> {
    let mut caps = DesiredCapabilities::chrome();
    if headless {
        for arg in ["--headless=new", "--disable-gpu", "--window-size=1920,1080"] {
            caps.add_arg(arg)?;
        }
    }
    caps.add_arg("--no-sandbox")?;
    caps.add_arg("--disable-dev-shm-usage")?;
    Ok(caps.into())
}

fn remote_capabilities(browser: &str, version: Option<&str>) -> Result<Capabilities> {
    let mut caps: Capabilities = match browser.to_ascii_lowercase().as_str() {
        "firefox" => DesiredCapabilities::firefox().into(),
        "edge" | "microsoftedge" => DesiredCapabilities::edge().into(),
        _ => DesiredCapabilities::chrome().into(),
    };
    if let Some(version) = version {
        caps.insert(
            "browserVersion".to_string(),
            serde_json::Value::String(version.to_string()),
        );
    }
    Ok(caps)
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    fn describe(&self) -> String {
        self.label.clone()
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn document_ready(&self) -> Result<bool> {
        let ret = self
            .driver
            .execute("return document.readyState === 'complete';", vec![])
            .await?;
        Ok(ret.json().as_bool().unwrap_or(false))
    }

    async fn is_clickable(&self, locator: &Locator) -> Result<bool> {
        match self.find(locator).await {
            Ok(element) => Ok(element.is_clickable().await?),
            Err(_) => Ok(false),
        }
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        match self.find(locator).await {
            Ok(element) => Ok(element.is_displayed().await?),
            Err(_) => Ok(false),
        }
    }

    async fn element_count(&self, locator: &Locator) -> Result<usize> {
        Ok(self.driver.find_all(to_by(locator)).await?.len())
    }

    async fn scroll_into_view(&self, locator: &Locator) -> Result<()> {
        let element = self.find(locator).await?;
        self.driver
            .execute(
                "arguments[0].scrollIntoView({block:'center'});",
                vec![element.to_json()?],
            )
            .await?;
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let element = self.find(locator).await?;
        element.click().await?;
        Ok(())
    }

    async fn click_via_script(&self, locator: &Locator) -> Result<()> {
        let element = self.find(locator).await?;
        self.driver
            .execute(
                "arguments[0].scrollIntoView(true); arguments[0].click();",
                vec![element.to_json()?],
            )
            .await?;
        Ok(())
    }

    async fn clear_text(&self, locator: &Locator) -> Result<()> {
        let element = self.find(locator).await?;
        element.clear().await?;
        Ok(())
    }

    async fn send_keys(&self, locator: &Locator, text: &str) -> Result<()> {
        let element = self.find(locator).await?;
        element.send_keys(text).await?;
        Ok(())
    }

    async fn element_text(&self, locator: &Locator) -> Result<String> {
        let element = self.find(locator).await?;
        Ok(element.text().await?)
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>> {
        Ok(self.driver.screenshot_as_png().await?)
    }

    async fn quit(self: Box<Self>) -> Result<()> {
        self.driver.quit().await?;
        Ok(())
    }
}
