//! In-memory browser session for engine tests.
//!
//! Every decision-making path in the runner operates on
//! `&dyn BrowserSession`, so tests script page state here instead of
//! driving a real browser.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::driver::traits::BrowserSession;
use crate::runner::locator::Locator;

#[derive(Default)]
struct Inner {
    calls: Vec<String>,
    clickable: HashSet<String>,
    visible: HashSet<String>,
    counts: HashMap<String, usize>,
    click_errors: HashSet<String>,
    script_click_errors: HashSet<String>,
    texts: HashMap<String, String>,
    typed: HashMap<String, String>,
    current_url: String,
    current_url_fails: bool,
    blank_after_navigate: bool,
    ready: bool,
}

/// Shared handle for scripting the fake and inspecting what it saw.
#[derive(Default)]
pub(crate) struct FakeState {
    inner: Mutex<Inner>,
}

impl FakeState {
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn set_clickable(&self, selector: &str, clickable: bool) {
        let mut inner = self.inner.lock().unwrap();
        if clickable {
            inner.clickable.insert(selector.to_string());
        } else {
            inner.clickable.remove(selector);
        }
    }

    pub fn set_visible(&self, selector: &str, visible: bool) {
        let mut inner = self.inner.lock().unwrap();
        if visible {
            inner.visible.insert(selector.to_string());
        } else {
            inner.visible.remove(selector);
        }
    }

    pub fn set_element_count(&self, selector: &str, count: usize) {
        self.inner
            .lock()
            .unwrap()
            .counts
            .insert(selector.to_string(), count);
    }

    pub fn fail_click(&self, selector: &str) {
        self.inner
            .lock()
            .unwrap()
            .click_errors
            .insert(selector.to_string());
    }

    pub fn fail_script_click(&self, selector: &str) {
        self.inner
            .lock()
            .unwrap()
            .script_click_errors
            .insert(selector.to_string());
    }

    pub fn set_text(&self, selector: &str, text: &str) {
        self.inner
            .lock()
            .unwrap()
            .texts
            .insert(selector.to_string(), text.to_string());
    }

    pub fn typed(&self, selector: &str) -> String {
        self.inner
            .lock()
            .unwrap()
            .typed
            .get(selector)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_current_url(&self, url: &str) {
        self.inner.lock().unwrap().current_url = url.to_string();
    }

    pub fn fail_current_url(&self) {
        self.inner.lock().unwrap().current_url_fails = true;
    }

    /// Simulate a tab that never leaves about:blank no matter what is
    /// navigated.
    pub fn set_blank_after_navigate(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.blank_after_navigate = true;
        inner.current_url = "about:blank".to_string();
    }

    pub fn set_ready(&self, ready: bool) {
        self.inner.lock().unwrap().ready = ready;
    }
}

pub(crate) struct FakeSession {
    state: Arc<FakeState>,
}

impl FakeSession {
    pub fn new() -> (Box<dyn BrowserSession>, Arc<FakeState>) {
        let state = Arc::new(FakeState::default());
        let session = Box::new(FakeSession {
            state: Arc::clone(&state),
        });
        (session, state)
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    fn describe(&self) -> String {
        "fake session".to_string()
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let mut inner = self.state.inner.lock().unwrap();
        inner.calls.push(format!("navigate:{}", url));
        if !inner.blank_after_navigate {
            inner.current_url = url.to_string();
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let inner = self.state.inner.lock().unwrap();
        if inner.current_url_fails {
            return Err(anyhow!("session gone"));
        }
        Ok(inner.current_url.clone())
    }

    async fn document_ready(&self) -> Result<bool> {
        Ok(self.state.inner.lock().unwrap().ready)
    }

    async fn is_clickable(&self, locator: &Locator) -> Result<bool> {
        Ok(self
            .state
            .inner
            .lock()
            .unwrap()
            .clickable
            .contains(&locator.value))
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        let inner = self.state.inner.lock().unwrap();
        // anything clickable is necessarily displayed
        Ok(inner.visible.contains(&locator.value) || inner.clickable.contains(&locator.value))
    }

    async fn element_count(&self, locator: &Locator) -> Result<usize> {
        Ok(self
            .state
            .inner
            .lock()
            .unwrap()
            .counts
            .get(&locator.value)
            .copied()
            .unwrap_or(0))
    }

    async fn scroll_into_view(&self, locator: &Locator) -> Result<()> {
        self.state
            .inner
            .lock()
            .unwrap()
            .calls
            .push(format!("scroll:{}", locator));
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let mut inner = self.state.inner.lock().unwrap();
        if inner.click_errors.contains(&locator.value) {
            return Err(anyhow!("element click intercepted: {}", locator));
        }
        inner.calls.push(format!("click:{}", locator));
        Ok(())
    }

    async fn click_via_script(&self, locator: &Locator) -> Result<()> {
        let mut inner = self.state.inner.lock().unwrap();
        if inner.script_click_errors.contains(&locator.value) {
            return Err(anyhow!("script click failed: {}", locator));
        }
        inner.calls.push(format!("click_js:{}", locator));
        Ok(())
    }

    async fn clear_text(&self, locator: &Locator) -> Result<()> {
        let mut inner = self.state.inner.lock().unwrap();
        inner.typed.remove(&locator.value);
        inner.calls.push(format!("clear:{}", locator));
        Ok(())
    }

    async fn send_keys(&self, locator: &Locator, text: &str) -> Result<()> {
        let mut inner = self.state.inner.lock().unwrap();
        inner
            .typed
            .entry(locator.value.clone())
            .or_default()
            .push_str(text);
        inner.calls.push(format!("keys:{}:{}", locator, text));
        Ok(())
    }

    async fn element_text(&self, locator: &Locator) -> Result<String> {
        self.state
            .inner
            .lock()
            .unwrap()
            .texts
            .get(&locator.value)
            .cloned()
            .ok_or_else(|| anyhow!("no such element: {}", locator))
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>> {
        self.state
            .inner
            .lock()
            .unwrap()
            .calls
            .push("screenshot".to_string());
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn quit(self: Box<Self>) -> Result<()> {
        self.state.inner.lock().unwrap().calls.push("quit".to_string());
        Ok(())
    }
}
