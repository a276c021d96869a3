use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use tokio::time::sleep;

use crate::config::ReplayConfig;
use crate::driver::traits::BrowserSession;
use crate::error::ReplayError;
use crate::parser::types::{Action, ActionKind};

use super::interaction::{attempt_click, generic_fallback_xpath, wait_for, Probe};
use super::locator::{self, Locator};
use super::log::ExecutionLog;
use super::recovery::maybe_recover;
use super::stability::await_stable;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Finished,
    Failed,
}

/// Drives a loaded action sequence against a browser session.
///
/// One dispatcher per run: it owns the session and the execution log,
/// executes actions strictly in order, and stops at the first fatal
/// error. Non-fatal trouble (blank-page recovery, readiness timeouts,
/// unknown actions) goes into the log as warning events instead.
pub struct Dispatcher {
    session: Box<dyn BrowserSession>,
    config: ReplayConfig,
    log: ExecutionLog,
    state: RunState,
}

impl Dispatcher {
    pub fn new(session: Box<dyn BrowserSession>, config: ReplayConfig) -> Self {
        let mut log = ExecutionLog::new();
        let detail = format!("{} run={}", session.describe(), log.run_id());
        log.append("driverStarted", detail);
        Self {
            session,
            config,
            log,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Reclaim the log and the session once the run is over.
    pub fn into_parts(self) -> (ExecutionLog, Box<dyn BrowserSession>) {
        (self.log, self.session)
    }

    /// Execute the full action sequence.
    ///
    /// `source` is a human-readable description of where the actions came
    /// from, recorded in the `run_start` event.
    pub async fn run(&mut self, actions: &[Action], source: &str) -> Result<(), ReplayError> {
        self.state = RunState::Running;
        self.log.append("run_start", source);

        for (index, action) in actions.iter().enumerate() {
            let summary = describe_action(action);
            println!("{} {}", "▶".blue(), summary);
            self.log.append("action_start", summary);

            // interactions need a live page; anything else tolerates blank
            if matches!(action.kind, ActionKind::Click | ActionKind::Type) {
                maybe_recover(
                    self.session.as_ref(),
                    &mut self.log,
                    &self.config,
                    actions,
                    index,
                )
                .await;
            }

            if let Err(e) = self.execute(action).await {
                self.state = RunState::Failed;
                self.log.append("run_error", e.to_string());
                println!("{} {}", "✗".red(), e.to_string().red());
                return Err(e);
            }

            self.log.append("action_end", action.kind.to_string());
        }

        self.state = RunState::Finished;
        self.log.append("run_finished", "success");
        println!("{} Run finished", "✓".green());
        Ok(())
    }

    async fn execute(&mut self, action: &Action) -> Result<(), ReplayError> {
        match &action.kind {
            ActionKind::Navigate => self.handle_navigate(action).await,
            ActionKind::Click => self.handle_click(action).await,
            ActionKind::Type => self.handle_type(action).await,
            ActionKind::Wait => self.handle_wait(action).await,
            ActionKind::Screenshot => self.handle_screenshot(action).await,
            ActionKind::AssertText => self.handle_assert_text(action).await,
            ActionKind::Unknown(tag) => {
                println!("{} Skipping unknown action: {}", "⚠".yellow(), tag);
                self.log.append("unknown_action", tag.clone());
                Ok(())
            }
        }
    }

    async fn handle_navigate(&mut self, action: &Action) -> Result<(), ReplayError> {
        let url = action
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ReplayError::Load("navigate action has no url".to_string()))?;

        self.log.append("navigate", url);
        self.session.navigate(url).await?;
        await_stable(
            self.session.as_ref(),
            &mut self.log,
            &self.config,
            self.config.navigate_settle_ms,
        )
        .await;
        Ok(())
    }

    async fn handle_click(&mut self, action: &Action) -> Result<(), ReplayError> {
        let target = locator::resolve(action.selector.as_deref())
            .ok_or_else(|| ReplayError::Load("click action has no selector".to_string()))?;

        let fallback = derive_fallback(&target, &self.config.fallback_keywords);
        let generic = generic_fallback_xpath(&self.config.fallback_keywords);
        let timeout_ms = action.timeout_ms.unwrap_or(self.config.click_timeout_ms);

        attempt_click(
            self.session.as_ref(),
            &mut self.log,
            &target,
            timeout_ms,
            self.config.poll_interval_ms,
            fallback.as_ref(),
            &generic,
        )
        .await
    }

    async fn handle_type(&mut self, action: &Action) -> Result<(), ReplayError> {
        let target = locator::resolve(action.selector.as_deref())
            .ok_or_else(|| ReplayError::Load("type action has no selector".to_string()))?;
        let text = action.value.as_deref().unwrap_or("");
        let timeout_ms = action
            .timeout_ms
            .unwrap_or(self.config.visibility_timeout_ms);

        if !wait_for(
            self.session.as_ref(),
            &target,
            Probe::Visible,
            timeout_ms,
            self.config.poll_interval_ms,
        )
        .await
        {
            return Err(ReplayError::Session(anyhow::anyhow!(
                "element {} never became visible for typing",
                target
            )));
        }

        if let Err(e) = self.session.clear_text(&target).await {
            log::debug!("could not clear {} before typing: {}", target, e);
        }

        if self.config.typing_delay_ms == 0 {
            self.session.send_keys(&target, text).await?;
            self.log.append("type", format!("{} => {}", target, text));
        } else {
            let mut buf = [0u8; 4];
            for ch in text.chars() {
                self.session
                    .send_keys(&target, ch.encode_utf8(&mut buf))
                    .await?;
                sleep(Duration::from_millis(self.config.typing_delay_ms)).await;
            }
            self.log
                .append("type_slow", format!("{} => {}", target, text));
        }
        Ok(())
    }

    async fn handle_wait(&mut self, action: &Action) -> Result<(), ReplayError> {
        let target = locator::resolve(action.selector.as_deref())
            .ok_or_else(|| ReplayError::Load("wait action has no selector".to_string()))?;
        let timeout_ms = action
            .timeout_ms
            .unwrap_or(self.config.visibility_timeout_ms);

        if !wait_for(
            self.session.as_ref(),
            &target,
            Probe::Visible,
            timeout_ms,
            self.config.poll_interval_ms,
        )
        .await
        {
            return Err(ReplayError::Session(anyhow::anyhow!(
                "element {} never became visible within {}ms",
                target,
                timeout_ms
            )));
        }

        self.log.append("wait", target.to_string());
        Ok(())
    }

    async fn handle_screenshot(&mut self, action: &Action) -> Result<(), ReplayError> {
        let bytes = self.session.screenshot_png().await?;

        let path = match &action.path {
            Some(p) => PathBuf::from(p),
            None => self.config.log_dir.join(format!(
                "screen-{}.png",
                chrono::Utc::now().timestamp_millis()
            )),
        };

        let written = (|| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &bytes)
        })();

        match written {
            Ok(()) => {
                self.log.append("screenshot", path.display().to_string());
            }
            Err(e) => {
                // the capture itself succeeded; losing the file is a warning
                log::warn!("could not write screenshot {}: {}", path.display(), e);
                self.log.append(
                    "persist_warning",
                    format!("screenshot not written to {}: {}", path.display(), e),
                );
            }
        }
        Ok(())
    }

    async fn handle_assert_text(&mut self, action: &Action) -> Result<(), ReplayError> {
        let target = locator::resolve(action.selector.as_deref())
            .ok_or_else(|| ReplayError::Load("assertText action has no selector".to_string()))?;
        let expected = action.value.as_deref().unwrap_or("");
        let timeout_ms = action
            .timeout_ms
            .unwrap_or(self.config.visibility_timeout_ms);

        if !wait_for(
            self.session.as_ref(),
            &target,
            Probe::Visible,
            timeout_ms,
            self.config.poll_interval_ms,
        )
        .await
        {
            return Err(ReplayError::Session(anyhow::anyhow!(
                "element {} never became visible within {}ms",
                target,
                timeout_ms
            )));
        }

        let actual = self.session.element_text(&target).await?;
        self.log
            .append("assertText", format!("{} -> {}", target, actual));

        if actual.contains(expected) {
            Ok(())
        } else {
            Err(ReplayError::AssertionFailed {
                expected: expected.to_string(),
                actual,
            })
        }
    }
}

/// Derive a same-keyword fallback locator from the recorded selector.
///
/// When the selector mentions one of the configured keywords, a looser
/// xpath matching that keyword in id or name gives the click chain a
/// second target.
fn derive_fallback(target: &Locator, keywords: &[String]) -> Option<Locator> {
    keywords
        .iter()
        .find(|kw| target.value.contains(kw.as_str()))
        .map(|kw| {
            Locator::xpath(format!(
                "//*[contains(@id,'{}') or contains(@name,'{}')]",
                kw, kw
            ))
        })
}

fn describe_action(action: &Action) -> String {
    let mut parts = vec![action.kind.to_string()];
    if let Some(selector) = &action.selector {
        parts.push(selector.clone());
    }
    if let Some(url) = &action.url {
        parts.push(url.clone());
    }
    if let Some(value) = &action.value {
        parts.push(format!("value={}", value));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::log::LogEntry;
    use crate::runner::testutil::{FakeSession, FakeState};
    use std::sync::Arc;

    fn fast_config() -> ReplayConfig {
        ReplayConfig {
            click_timeout_ms: 0,
            visibility_timeout_ms: 0,
            ready_timeout_ms: 200,
            poll_interval_ms: 1,
            navigate_settle_ms: 0,
            recovery_settle_ms: 0,
            ..ReplayConfig::default()
        }
    }

    fn dispatcher_with(config: ReplayConfig) -> (Dispatcher, Arc<FakeState>) {
        let (session, state) = FakeSession::new();
        state.set_ready(true);
        (Dispatcher::new(session, config), state)
    }

    fn actions(raw: &str) -> Vec<Action> {
        serde_json::from_str(raw).unwrap()
    }

    fn events(d: &Dispatcher) -> Vec<String> {
        d.log.entries().iter().map(|e| e.event.clone()).collect()
    }

    #[tokio::test]
    async fn test_successful_run_log_ordering() {
        let (mut d, state) = dispatcher_with(fast_config());
        state.set_clickable("#go", true);

        let seq = actions(
            r##"[{"action":"navigate","url":"https://a.test"},
                {"action":"click","selector":"#go"}]"##,
        );
        d.run(&seq, "demo.json").await.unwrap();

        assert_eq!(d.state(), RunState::Finished);
        assert_eq!(
            events(&d),
            vec![
                "driverStarted",
                "run_start",
                "action_start",
                "navigate",
                "action_end",
                "action_start",
                "click",
                "action_end",
                "run_finished",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_click_stops_the_run() {
        let (mut d, _state) = dispatcher_with(fast_config());

        let seq = actions(
            r##"[{"action":"navigate","url":"https://a.test"},
                {"action":"click","selector":"#missing"},
                {"action":"screenshot"}]"##,
        );
        let err = d.run(&seq, "demo.json").await.unwrap_err();

        assert!(matches!(err, ReplayError::InteractionExhausted { .. }));
        assert_eq!(d.state(), RunState::Failed);
        let ev = events(&d);
        assert_eq!(ev.last().unwrap(), "run_error");
        // the screenshot after the failing click never ran
        assert!(!ev.contains(&"screenshot".to_string()));
    }

    #[tokio::test]
    async fn test_instant_and_slow_typing_produce_the_same_text() {
        let seq = actions(
            r##"[{"action":"navigate","url":"https://a.test"},
                {"action":"type","selector":"#email","value":"a@b.c"}]"##,
        );

        let (mut d, state) = dispatcher_with(fast_config());
        state.set_visible("#email", true);
        d.run(&seq, "demo.json").await.unwrap();
        assert_eq!(state.typed("#email"), "a@b.c");
        assert!(events(&d).contains(&"type".to_string()));

        let slow = ReplayConfig {
            typing_delay_ms: 1,
            ..fast_config()
        };
        let (mut d, state) = dispatcher_with(slow);
        state.set_visible("#email", true);
        d.run(&seq, "demo.json").await.unwrap();
        assert_eq!(state.typed("#email"), "a@b.c");
        assert!(events(&d).contains(&"type_slow".to_string()));
    }

    #[tokio::test]
    async fn test_assert_text_contains() {
        let seq = actions(
            r##"[{"action":"navigate","url":"https://a.test"},
                {"action":"assertText","selector":"#banner","value":"Welcome"}]"##,
        );

        let (mut d, state) = dispatcher_with(fast_config());
        state.set_visible("#banner", true);
        state.set_text("#banner", "Welcome back, Ada");
        d.run(&seq, "demo.json").await.unwrap();
        assert_eq!(d.state(), RunState::Finished);

        let (mut d, state) = dispatcher_with(fast_config());
        state.set_visible("#banner", true);
        state.set_text("#banner", "Access denied");
        let err = d.run(&seq, "demo.json").await.unwrap_err();
        assert!(matches!(err, ReplayError::AssertionFailed { .. }));
        assert_eq!(d.state(), RunState::Failed);
    }

    #[tokio::test]
    async fn test_assert_text_requires_visibility() {
        let (mut d, state) = dispatcher_with(fast_config());
        // element holds matching text but never becomes visible
        state.set_text("#hidden", "Welcome, Sam");

        let seq = actions(
            r##"[{"action":"navigate","url":"https://a.test"},
                {"action":"assertText","selector":"#hidden","value":"Sam"}]"##,
        );
        let err = d.run(&seq, "demo.json").await.unwrap_err();

        assert!(matches!(err, ReplayError::Session(_)));
        assert_eq!(d.state(), RunState::Failed);
    }

    #[tokio::test]
    async fn test_unknown_action_is_not_fatal() {
        let (mut d, state) = dispatcher_with(fast_config());
        state.set_visible("#menu", true);

        let seq = actions(
            r##"[{"action":"navigate","url":"https://a.test"},
                {"action":"hover","selector":"#menu"},
                {"action":"wait","selector":"#menu"}]"##,
        );
        d.run(&seq, "demo.json").await.unwrap();

        assert_eq!(d.state(), RunState::Finished);
        let ev = events(&d);
        assert!(ev.contains(&"unknown_action".to_string()));
        assert!(ev.contains(&"wait".to_string()));
    }

    #[tokio::test]
    async fn test_session_start_entry_carries_the_run_id() {
        let (d, _state) = dispatcher_with(fast_config());

        let first = &d.log.entries()[0];
        assert_eq!(first.event, "driverStarted");
        assert!(first.detail.contains(d.log.run_id()));
    }

    #[tokio::test]
    async fn test_wait_timeout_fails_the_run() {
        let (mut d, _state) = dispatcher_with(fast_config());

        let seq = actions(
            r##"[{"action":"navigate","url":"https://a.test"},
                {"action":"wait","selector":"#never"}]"##,
        );
        let err = d.run(&seq, "demo.json").await.unwrap_err();

        assert!(matches!(err, ReplayError::Session(_)));
        assert_eq!(d.state(), RunState::Failed);
        assert_eq!(events(&d).last().unwrap(), "run_error");
    }

    #[tokio::test]
    async fn test_wait_without_selector_is_a_load_error() {
        let (mut d, _state) = dispatcher_with(fast_config());

        let seq = actions(
            r##"[{"action":"navigate","url":"https://a.test"},
                {"action":"wait","timeout":500}]"##,
        );
        let err = d.run(&seq, "demo.json").await.unwrap_err();
        assert!(matches!(err, ReplayError::Load(_)));
    }

    #[tokio::test]
    async fn test_blank_page_recovery_runs_before_interactions() {
        let (mut d, state) = dispatcher_with(fast_config());
        // no navigate in the history, page never left about:blank
        state.set_current_url("about:blank");
        state.set_clickable("#go", true);

        let seq = actions(r##"[{"action":"click","selector":"#go"}]"##);
        d.run(&seq, "demo.json").await.unwrap();

        let ev = events(&d);
        let warn = ev.iter().position(|e| e == "recover_warning").unwrap();
        let click = ev.iter().position(|e| e == "click").unwrap();
        assert!(warn < click);
    }

    #[tokio::test]
    async fn test_stranded_tab_renavigates_before_the_click() {
        let (mut d, state) = dispatcher_with(fast_config());
        state.set_blank_after_navigate();
        state.set_clickable("#go", true);

        let seq = actions(
            r##"[{"action":"navigate","url":"https://a.test"},
                {"action":"click","selector":"#go"}]"##,
        );
        d.run(&seq, "demo.json").await.unwrap();

        let recoveries: Vec<&LogEntry> = d
            .log
            .entries()
            .iter()
            .filter(|e| e.event == "recover_navigate")
            .collect();
        assert_eq!(recoveries.len(), 1);
        assert_eq!(recoveries[0].detail, "https://a.test");

        // the recovery navigation happens right before the click lands
        let nav_count = state
            .calls()
            .iter()
            .filter(|c| *c == "navigate:https://a.test")
            .count();
        assert_eq!(nav_count, 2);
    }

    #[tokio::test]
    async fn test_screenshot_default_path() {
        let dir = std::env::temp_dir().join(format!("replay-shot-{}", uuid::Uuid::new_v4()));
        let config = ReplayConfig {
            log_dir: dir.clone(),
            ..fast_config()
        };
        let (mut d, _state) = dispatcher_with(config);

        let seq = actions(
            r##"[{"action":"navigate","url":"https://a.test"},
                {"action":"screenshot"}]"##,
        );
        d.run(&seq, "demo.json").await.unwrap();

        let shot = d
            .log
            .entries()
            .iter()
            .find(|e| e.event == "screenshot")
            .unwrap();
        assert!(shot.detail.contains("screen-"));
        assert!(std::path::Path::new(&shot.detail).exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_per_action_timeout_override() {
        let (mut d, state) = dispatcher_with(fast_config());
        state.set_clickable("#slow", true);

        // a large recorded timeout must not stall when the element is
        // already clickable
        let seq = actions(
            r##"[{"action":"navigate","url":"https://a.test"},
                {"action":"click","selector":"#slow","timeout":60000}]"##,
        );
        let start = std::time::Instant::now();
        d.run(&seq, "demo.json").await.unwrap();
        assert!(start.elapsed().as_secs() < 30);
    }
}
