pub mod dispatcher;
pub mod interaction;
pub mod locator;
pub mod log;
pub mod recovery;
pub mod stability;

#[cfg(test)]
pub(crate) mod testutil;

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::config::ReplayConfig;
use crate::driver::acquire_session;
use crate::driver::webdriver::SessionConfig;
use crate::parser::{ensure_leading_navigate, load_recording};

pub use dispatcher::{Dispatcher, RunState};

/// Replay a recording file end to end.
///
/// Loads and validates the recording, acquires a browser session, runs the
/// dispatcher, then persists the execution log and quits the session. Log
/// persistence and session teardown are best-effort; the run's own outcome
/// is what this returns.
pub async fn run_recording(
    path: &Path,
    config: ReplayConfig,
    session_config: SessionConfig,
) -> Result<()> {
    let recording = load_recording(path)?;
    let actions = ensure_leading_navigate(recording, config.default_url.as_deref())?;

    println!(
        "{} Replaying {} action(s) from {}",
        "▶".green().bold(),
        actions.len(),
        path.display().to_string().cyan()
    );

    let log_dir = config.log_dir.clone();
    let session = acquire_session(&session_config).await?;
    let mut dispatcher = Dispatcher::new(session, config);

    let result = dispatcher.run(&actions, &path.display().to_string()).await;

    let (run_log, session) = dispatcher.into_parts();
    match run_log.persist(&log_dir) {
        Ok(log_path) => println!(
            "{} Log written to {}",
            "📝".blue(),
            log_path.display().to_string().cyan()
        ),
        Err(e) => println!("{} Could not write execution log: {}", "⚠".yellow(), e),
    }

    if let Err(e) = session.quit().await {
        println!("{} Error stopping session: {}", "⚠".yellow(), e);
    }

    result?;
    Ok(())
}
