use crate::config::ReplayConfig;
use crate::driver::traits::BrowserSession;
use crate::parser::types::{Action, ActionKind};

use super::log::ExecutionLog;
use super::stability::await_stable;

/// Detect a stranded page and steer it back before an interaction.
///
/// A page is stranded when the current URL is empty, a `data:` URL, or
/// exactly `about:blank`. Recovery re-issues the most recent navigate
/// before the current action; everything here is best-effort and only
/// ever produces warning log entries.
pub async fn maybe_recover(
    session: &dyn BrowserSession,
    log: &mut ExecutionLog,
    config: &ReplayConfig,
    history: &[Action],
    current_index: usize,
) {
    let current = match session.current_url().await {
        Ok(url) => url,
        Err(e) => {
            log::warn!("could not read current URL: {}", e);
            log.append("recover_warning", format!("current URL unavailable: {}", e));
            return;
        }
    };

    if !is_stranded(&current) {
        return;
    }

    let last_navigate = history[..current_index]
        .iter()
        .rev()
        .find(|a| a.kind == ActionKind::Navigate && a.url.as_deref().is_some_and(|u| !u.is_empty()))
        .and_then(|a| a.url.as_deref());

    match last_navigate {
        Some(url) => {
            log::warn!("page is blank ({:?}), re-navigating to {}", current, url);
            log.append("recover_navigate", url);
            if let Err(e) = session.navigate(url).await {
                log::warn!("recovery navigate failed: {}", e);
            }
            await_stable(session, log, config, config.recovery_settle_ms).await;
        }
        None => {
            log.append(
                "recover_warning",
                format!("page is blank ({:?}) and no prior navigate exists", current),
            );
        }
    }
}

fn is_stranded(url: &str) -> bool {
    url.is_empty() || url.starts_with("data:") || url == "about:blank"
}
