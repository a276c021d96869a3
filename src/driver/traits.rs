use anyhow::Result;
use async_trait::async_trait;

use crate::runner::locator::Locator;

/// Driver-agnostic browser session interface
///
/// This trait is the boundary between the replay engine and whatever is
/// actually driving the browser. Every method is a single-shot operation:
/// all polling, timeouts and retry chains live in the engine, so the
/// decision logic can be exercised against a fake session in tests.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Short human-readable description for the session-start log entry
    /// (e.g. "local chrome (headless=true)")
    fn describe(&self) -> String;

    /// Load a URL in the current tab
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Read the current page URL
    async fn current_url(&self) -> Result<String>;

    /// Probe the page's readiness signal (document fully parsed)
    async fn document_ready(&self) -> Result<bool>;

    /// Whether an element matching the locator is present, visible and
    /// enabled right now; false when no element matches
    async fn is_clickable(&self, locator: &Locator) -> Result<bool>;

    /// Whether an element matching the locator is displayed right now;
    /// false when no element matches
    async fn is_visible(&self, locator: &Locator) -> Result<bool>;

    /// Number of elements currently matching the locator, without waiting
    async fn element_count(&self, locator: &Locator) -> Result<usize>;

    /// Best-effort instruction to center the first match in the viewport
    async fn scroll_into_view(&self, locator: &Locator) -> Result<()>;

    /// Native click on the first match; fails when the element is obscured
    /// or otherwise not interactable
    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Script-level click dispatch on the first match, bypassing native
    /// interactability checks
    async fn click_via_script(&self, locator: &Locator) -> Result<()>;

    /// Clear the current value of the first match
    async fn clear_text(&self, locator: &Locator) -> Result<()>;

    /// Send keystrokes to the first match
    async fn send_keys(&self, locator: &Locator, text: &str) -> Result<()>;

    /// Rendered text of the first match
    async fn element_text(&self, locator: &Locator) -> Result<String>;

    /// Capture the current viewport as PNG bytes
    async fn screenshot_png(&self) -> Result<Vec<u8>>;

    /// Tear the session down, closing the browser where applicable
    async fn quit(self: Box<Self>) -> Result<()>;
}
