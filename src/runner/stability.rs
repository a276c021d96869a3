use std::time::Duration;

use tokio::time::sleep;

use crate::config::ReplayConfig;
use crate::driver::traits::BrowserSession;

use super::log::ExecutionLog;

/// Wait for the page to settle after a navigation-like event.
///
/// Two phases: poll the document readiness signal up to the configured
/// readiness timeout, then apply an unconditional quiescence pause for
/// late scripts and redirects. Readiness timing out is logged as a
/// warning, never an error; this function cannot fail a run.
pub async fn await_stable(
    session: &dyn BrowserSession,
    log: &mut ExecutionLog,
    config: &ReplayConfig,
    quiescence_ms: u64,
) {
    let start = std::time::Instant::now();
    let mut ready = false;
    loop {
        // A probe failure (mid-navigation, dead frame) just means "not
        // ready yet".
        if session.document_ready().await.unwrap_or(false) {
            ready = true;
            break;
        }
        if start.elapsed().as_millis() >= config.ready_timeout_ms as u128 {
            break;
        }
        sleep(Duration::from_millis(config.poll_interval_ms)).await;
    }

    if !ready {
        log::warn!(
            "page did not reach readiness within {}ms",
            config.ready_timeout_ms
        );
        log.append(
            "readiness_timeout",
            format!("not ready after {}ms", config.ready_timeout_ms),
        );
    }

    sleep(Duration::from_millis(quiescence_ms)).await;
}
