use thiserror::Error;

/// Fatal failure categories for a replay run.
///
/// Anything that is merely a warning (recovery could not find a prior
/// navigate, readiness poll timed out, a log or screenshot write failed)
/// never becomes a `ReplayError`; it is appended to the execution log and
/// mirrored through `log::warn!`, and the run continues.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The recording file could not be read or has an unsupported shape.
    #[error("invalid recording: {0}")]
    Load(String),

    /// The recording does not start with a navigate and no start URL was
    /// supplied in the recording or the configuration.
    #[error("missing start URL: recording has no initial navigate and no startUrl/defaultUrl was supplied")]
    MissingStartUrl,

    /// Every click strategy was tried, in order, and all of them failed.
    #[error("all click strategies failed for {locator} (clickable wait, fallback locator, script click, generic fallback)")]
    InteractionExhausted { locator: String },

    /// An assertText action found the element but the expected substring
    /// was absent from its rendered text.
    #[error("assertText failed: expected to contain {expected:?} but was {actual:?}")]
    AssertionFailed { expected: String, actual: String },

    /// A browser session operation failed mid-action.
    #[error(transparent)]
    Session(#[from] anyhow::Error),
}
