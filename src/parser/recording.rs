use serde::Deserialize;
use std::path::Path;

use super::types::{Action, ActionKind};
use crate::error::ReplayError;

/// A loaded recording: the ordered action sequence plus the optional
/// embedded start URL.
#[derive(Debug, Clone)]
pub struct Recording {
    pub actions: Vec<Action>,
    pub start_url: Option<String>,
}

#[derive(Deserialize)]
struct RecordingObject {
    actions: Vec<Action>,
    #[serde(rename = "startUrl", default)]
    start_url: Option<String>,
}

/// Load a recording file.
///
/// Accepted shapes: a bare JSON array of actions, or an object
/// `{ "actions": [...], "startUrl": "<url>" }`. Anything else is a fatal
/// `Load` error.
pub fn load_recording(path: &Path) -> Result<Recording, ReplayError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ReplayError::Load(format!("failed to read {}: {}", path.display(), e)))?;
    parse_recording(&raw)
}

/// Parse recording content, independent of the filesystem.
pub fn parse_recording(raw: &str) -> Result<Recording, ReplayError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| ReplayError::Load(format!("not valid JSON: {}", e)))?;

    match value {
        serde_json::Value::Array(_) => {
            let actions: Vec<Action> = serde_json::from_value(value)
                .map_err(|e| ReplayError::Load(format!("malformed action: {}", e)))?;
            Ok(Recording {
                actions,
                start_url: None,
            })
        }
        serde_json::Value::Object(ref map) if map.contains_key("actions") => {
            let object: RecordingObject = serde_json::from_value(value)
                .map_err(|e| ReplayError::Load(format!("malformed action: {}", e)))?;
            Ok(Recording {
                actions: object.actions,
                start_url: object.start_url,
            })
        }
        _ => Err(ReplayError::Load(
            "expected a JSON array or an object with an \"actions\" key".to_string(),
        )),
    }
}

/// Enforce the leading-navigate invariant.
///
/// The sequence must begin with a navigate carrying a non-empty absolute
/// URL. If it does not, a navigate is synthesized from the recording's
/// startUrl, falling back to the configured default URL. With neither
/// available loading fails with `MissingStartUrl`; there is no implicit
/// `about:blank` fallback.
pub fn ensure_leading_navigate(
    recording: Recording,
    default_url: Option<&str>,
) -> Result<Vec<Action>, ReplayError> {
    let Recording {
        mut actions,
        start_url,
    } = recording;

    let has_leading_navigate = actions
        .first()
        .map(|a| a.kind == ActionKind::Navigate && a.url.as_deref().is_some_and(|u| !u.is_empty()))
        .unwrap_or(false);

    if has_leading_navigate {
        let first_url = actions[0].url.as_deref().unwrap_or_default();
        require_absolute(first_url)?;
        return Ok(actions);
    }

    let to_use = start_url
        .as_deref()
        .filter(|u| !u.is_empty())
        .or(default_url.filter(|u| !u.is_empty()))
        .ok_or(ReplayError::MissingStartUrl)?;
    require_absolute(to_use)?;

    log::info!("auto-inserting navigate to {}", to_use);
    actions.insert(0, Action::synthetic_navigate(to_use));
    Ok(actions)
}

fn require_absolute(raw: &str) -> Result<(), ReplayError> {
    url::Url::parse(raw)
        .map(|_| ())
        .map_err(|_| ReplayError::Load(format!("start URL is not absolute: {:?}", raw)))
}
