use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;

/// Kind of a recorded step.
///
/// This is a closed enum so the dispatcher can match exhaustively; a tag the
/// recorder does not know about becomes `Unknown` carrying the raw string
/// instead of disappearing into a default branch. Tags are matched
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Navigate,
    Click,
    Type,
    Wait,
    Screenshot,
    AssertText,
    Unknown(String),
}

impl From<&str> for ActionKind {
    fn from(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "navigate" => ActionKind::Navigate,
            "click" => ActionKind::Click,
            "type" => ActionKind::Type,
            "wait" => ActionKind::Wait,
            "screenshot" => ActionKind::Screenshot,
            "asserttext" => ActionKind::AssertText,
            _ => ActionKind::Unknown(tag.to_string()),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Navigate => write!(f, "navigate"),
            ActionKind::Click => write!(f, "click"),
            ActionKind::Type => write!(f, "type"),
            ActionKind::Wait => write!(f, "wait"),
            ActionKind::Screenshot => write!(f, "screenshot"),
            ActionKind::AssertText => write!(f, "assertText"),
            ActionKind::Unknown(tag) => write!(f, "{}", tag),
        }
    }
}

impl<'de> Deserialize<'de> for ActionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(ActionKind::from(tag.as_str()))
    }
}

/// One recorded step.
///
/// Field names follow the recording wire format produced by the browser
/// extension: `action`, `timeout`, `time`. Actions are immutable once
/// loaded; the full ordered sequence is fixed before execution begins.
#[derive(Debug, Clone, Deserialize)]
pub struct Action {
    #[serde(rename = "action")]
    pub kind: ActionKind,

    /// Strategy-prefixed selector string (`css=`, `xpath=`, or bare css)
    #[serde(default)]
    pub selector: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub value: Option<String>,

    /// Per-action timeout override (ms); each handler has its own default
    #[serde(rename = "timeout", default)]
    pub timeout_ms: Option<u64>,

    /// Screenshot destination
    #[serde(default)]
    pub path: Option<String>,

    /// Opaque key-value bag, passthrough only
    #[serde(default)]
    pub meta: Option<HashMap<String, serde_json::Value>>,

    /// Epoch milliseconds at recording time
    #[serde(rename = "time", default)]
    pub recorded_at: Option<i64>,
}

impl Action {
    /// Build a synthetic navigate used when the recording does not open
    /// with one.
    pub fn synthetic_navigate(url: &str) -> Self {
        Self {
            kind: ActionKind::Navigate,
            selector: None,
            url: Some(url.to_string()),
            value: None,
            timeout_ms: None,
            path: None,
            meta: None,
            recorded_at: Some(chrono::Utc::now().timestamp_millis()),
        }
    }
}
