use std::time::Duration;

use tokio::time::sleep;

use crate::driver::traits::BrowserSession;
use crate::error::ReplayError;

use super::locator::Locator;
use super::log::ExecutionLog;

/// What a `wait_for` poll is probing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Clickable,
    Visible,
    Present,
}

/// Poll a probe until it reports true or the timeout elapses.
///
/// The probe is checked at least once even with a zero timeout, and a
/// probe error counts as "not yet" rather than aborting the wait.
pub async fn wait_for(
    session: &dyn BrowserSession,
    locator: &Locator,
    probe: Probe,
    timeout_ms: u64,
    poll_ms: u64,
) -> bool {
    let start = std::time::Instant::now();
    loop {
        let hit = match probe {
            Probe::Clickable => session.is_clickable(locator).await.unwrap_or(false),
            Probe::Visible => session.is_visible(locator).await.unwrap_or(false),
            Probe::Present => session.element_count(locator).await.unwrap_or(0) > 0,
        };
        if hit {
            return true;
        }
        if start.elapsed().as_millis() >= timeout_ms as u128 {
            return false;
        }
        sleep(Duration::from_millis(poll_ms)).await;
    }
}

/// Build the keyword-based last-resort locator.
///
/// Matches any element whose id or name contains one of the configured
/// keywords, or whose class contains `btn`.
pub fn generic_fallback_xpath(keywords: &[String]) -> Locator {
    let mut clauses: Vec<String> = Vec::new();
    for keyword in keywords {
        clauses.push(format!("contains(@id,'{}')", keyword));
        clauses.push(format!("contains(@name,'{}')", keyword));
    }
    clauses.push("contains(@class,'btn')".to_string());
    Locator::xpath(format!("//*[{}]", clauses.join(" or ")))
}

/// Click an element through the four-strategy recovery chain.
///
/// 1. Wait for the recorded locator to become clickable, scroll it into
///    view, and click natively.
/// 2. If a fallback locator was derived, try a native click on it.
/// 3. Script-level click on the recorded locator, if it matches anything
///    right now.
/// 4. Wait for the keyword-based generic locator to match, then
///    script-click it.
///
/// Each strategy logs its own event on success; only full exhaustion is
/// fatal.
pub async fn attempt_click(
    session: &dyn BrowserSession,
    log: &mut ExecutionLog,
    locator: &Locator,
    timeout_ms: u64,
    poll_ms: u64,
    fallback: Option<&Locator>,
    generic: &Locator,
) -> Result<(), ReplayError> {
    // strategy 1: native click after the element reports clickable
    if wait_for(session, locator, Probe::Clickable, timeout_ms, poll_ms).await {
        if session.scroll_into_view(locator).await.is_err() {
            log::debug!("scroll before click failed for {}", locator);
        }
        if session.click(locator).await.is_ok() {
            log.append("click", locator.to_string());
            return Ok(());
        }
    }

    // strategy 2: native click on the derived fallback locator
    if let Some(fallback) = fallback {
        if wait_for(session, fallback, Probe::Clickable, timeout_ms, poll_ms).await {
            if session.scroll_into_view(fallback).await.is_err() {
                log::debug!("scroll before click failed for {}", fallback);
            }
            if session.click(fallback).await.is_ok() {
                log.append("click_fallback_xpath", fallback.to_string());
                return Ok(());
            }
        }
    }

    // strategy 3: script click bypassing interactability checks, only when
    // the element exists right now (no waiting)
    if session.element_count(locator).await.unwrap_or(0) > 0
        && session.click_via_script(locator).await.is_ok()
    {
        log.append("click_js", locator.to_string());
        return Ok(());
    }

    // strategy 4: keyword-based generic locator, script-clicked
    if wait_for(session, generic, Probe::Present, timeout_ms, poll_ms).await
        && session.click_via_script(generic).await.is_ok()
    {
        log.append("click_generic_fallback", generic.to_string());
        return Ok(());
    }

    Err(ReplayError::InteractionExhausted {
        locator: locator.to_string(),
    })
}
