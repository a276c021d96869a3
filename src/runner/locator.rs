use std::fmt;

/// Element lookup strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Css,
    Xpath,
}

/// A resolved element locator: strategy plus the raw selector expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub strategy: Strategy,
    pub value: String,
}

impl Locator {
    pub fn css(value: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::Css,
            value: value.into(),
        }
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::Xpath,
            value: value.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.strategy {
            Strategy::Css => write!(f, "css={}", self.value),
            Strategy::Xpath => write!(f, "xpath={}", self.value),
        }
    }
}

/// Resolve a recorded selector string into a locator.
///
/// `css=` and `xpath=` prefixes select the strategy explicitly; anything
/// else is treated as a bare CSS selector. Missing selectors resolve to
/// `None` so each handler can decide whether that is fatal.
pub fn resolve(selector: Option<&str>) -> Option<Locator> {
    let raw = selector?;
    if let Some(rest) = raw.strip_prefix("css=") {
        Some(Locator::css(rest))
    } else if let Some(rest) = raw.strip_prefix("xpath=") {
        Some(Locator::xpath(rest))
    } else {
        Some(Locator::css(raw))
    }
}
