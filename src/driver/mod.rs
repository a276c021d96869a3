pub mod traits;
pub mod webdriver;

use anyhow::Result;
use colored::Colorize;

use self::traits::BrowserSession;
use self::webdriver::{SessionConfig, SessionMode, WebDriverSession};

/// Acquire a browser session for the requested mode.
///
/// The session handle is the single shared resource of a run; the caller
/// owns it exclusively until it is quit.
pub async fn acquire_session(config: &SessionConfig) -> Result<Box<dyn BrowserSession>> {
    match config.mode {
        SessionMode::Local => {
            println!(
                "{} Starting local session (headless={})",
                "🌐".blue(),
                config.headless
            );
        }
        SessionMode::Remote => {
            println!(
                "{} Connecting to remote session: {}",
                "🔌".blue(),
                config.remote_url.as_deref().unwrap_or("<missing>").cyan()
            );
        }
    }

    let session = WebDriverSession::connect(config).await?;
    Ok(Box::new(session))
}
