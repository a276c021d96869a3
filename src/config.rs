use std::path::PathBuf;

/// Replay configuration
///
/// Timing values are site-dependent tuning knobs, not universal constants,
/// so all of them are configurable rather than baked into the engine.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Fallback start URL when the recording has no initial navigate and
    /// no embedded startUrl
    pub default_url: Option<String>,

    /// Delay between keystrokes while typing (ms); 0 sends the value in one
    /// operation
    pub typing_delay_ms: u64,

    /// Execution-log output directory
    pub log_dir: PathBuf,

    /// Default timeout for the click-retry chain (ms)
    pub click_timeout_ms: u64,

    /// Default timeout for visibility waits in type/wait/assertText (ms)
    pub visibility_timeout_ms: u64,

    /// Upper bound for the document-readiness poll (ms); exceeding it is a
    /// warning, not a failure
    pub ready_timeout_ms: u64,

    /// Poll interval for readiness/visibility/clickability waits (ms)
    pub poll_interval_ms: u64,

    /// Unconditional settle pause after a navigate action (ms)
    pub navigate_settle_ms: u64,

    /// Unconditional settle pause after a blank-page recovery navigation (ms)
    pub recovery_settle_ms: u64,

    /// Selector substrings that trigger the fallback click locator; also
    /// feeds the generic affordance XPath tried as the last click strategy
    pub fallback_keywords: Vec<String>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            default_url: None,
            typing_delay_ms: 0,
            log_dir: PathBuf::from("out"),
            click_timeout_ms: 25_000,
            visibility_timeout_ms: 12_000,
            ready_timeout_ms: 20_000,
            poll_interval_ms: 250,
            navigate_settle_ms: 3_000,
            recovery_settle_ms: 800,
            fallback_keywords: vec![
                "acceptTerms".to_string(),
                "submit".to_string(),
                "proceed".to_string(),
                "login".to_string(),
            ],
        }
    }
}
