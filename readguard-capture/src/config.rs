//! Capture configuration.

use crate::error::CaptureResult;
use crate::input::{KeyChord, DEFAULT_BLOCKED_SHORTCUTS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay before content is unblurred after the reader returns.
pub const DEFAULT_UNBLUR_DELAY_MS: u64 = 500;

/// Clipboard contents written in place of copied text.
pub const DEFAULT_WARNING_TEXT: &str =
    "This content is protected. Copying is not permitted.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureConfig {
    pub unblur_delay_ms: u64,
    pub warning_text: String,
    /// Shortcuts such as `"Ctrl+Shift+I"`. `Ctrl` also matches `Cmd`.
    pub blocked_shortcuts: Vec<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            unblur_delay_ms: DEFAULT_UNBLUR_DELAY_MS,
            warning_text: DEFAULT_WARNING_TEXT.to_string(),
            blocked_shortcuts: DEFAULT_BLOCKED_SHORTCUTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl CaptureConfig {
    pub fn unblur_delay(&self) -> Duration {
        Duration::from_millis(self.unblur_delay_ms)
    }

    /// Parses `blocked_shortcuts`, failing on the first invalid entry.
    pub fn shortcuts(&self) -> CaptureResult<Vec<KeyChord>> {
        self.blocked_shortcuts.iter().map(|s| s.parse()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.unblur_delay(), Duration::from_millis(500));
        assert_eq!(config.shortcuts().unwrap().len(), DEFAULT_BLOCKED_SHORTCUTS.len());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: CaptureConfig = serde_json::from_str(r#"{"unblurDelayMs": 750}"#).unwrap();
        assert_eq!(config.unblur_delay_ms, 750);
        assert_eq!(config.warning_text, DEFAULT_WARNING_TEXT);
    }

    #[test]
    fn bad_shortcut_is_reported() {
        let config = CaptureConfig {
            blocked_shortcuts: vec!["Ctrl+".into()],
            ..Default::default()
        };
        assert!(config.shortcuts().is_err());
    }
}
