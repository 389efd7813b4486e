//! Input suppression: clipboard, print, drag and keyboard shortcuts.

use crate::config::CaptureConfig;
use crate::controller::AttemptCounter;
use crate::error::{CaptureError, CaptureResult};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Shortcuts suppressed unless configured otherwise.
pub const DEFAULT_BLOCKED_SHORTCUTS: &[&str] = &[
    "Ctrl+C",
    "Ctrl+A",
    "Ctrl+S",
    "Ctrl+P",
    "Ctrl+U",
    "Ctrl+X",
    "F12",
    "Ctrl+Shift+I",
    "Ctrl+Shift+J",
    "Ctrl+Shift+C",
    "PrintScreen",
];

/// A key plus modifiers. `primary` is Ctrl on Windows/Linux and Cmd on macOS.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub primary: bool,
    pub shift: bool,
    pub alt: bool,
    pub key: String,
}

impl KeyChord {
    pub fn new(key: &str) -> Self {
        Self {
            primary: false,
            shift: false,
            alt: false,
            key: normalize_key(key),
        }
    }

    pub fn with_primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

fn normalize_key(key: &str) -> String {
    let key = key.trim();
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_ascii_uppercase().to_string(),
        _ if key.eq_ignore_ascii_case("printscreen")
            || key.eq_ignore_ascii_case("prtsc")
            || key.eq_ignore_ascii_case("print") =>
        {
            "PrintScreen".to_string()
        }
        (Some('f' | 'F'), Some(_)) if key[1..].chars().all(|c| c.is_ascii_digit()) => {
            key.to_ascii_uppercase()
        }
        _ => key.to_string(),
    }
}

impl FromStr for KeyChord {
    type Err = CaptureError;

    fn from_str(s: &str) -> CaptureResult<Self> {
        let invalid = || CaptureError::InvalidShortcut(s.to_string());
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key = parts.pop().filter(|k| !k.is_empty()).ok_or_else(invalid)?;

        let mut chord = KeyChord::new(key);
        for modifier in parts {
            match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "cmd" | "command" | "meta" => chord.primary = true,
                "shift" => chord.shift = true,
                "alt" | "option" => chord.alt = true,
                _ => return Err(invalid()),
            }
        }
        Ok(chord)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.primary {
            f.write_str("Ctrl+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        f.write_str(&self.key)
    }
}

/// Events the host forwards from the content subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Copy,
    Cut,
    ContextMenu,
    DragStart,
    BeforePrint,
    KeyDown(KeyChord),
}

/// What the host should do with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    /// Cancel the default action.
    Suppress,
    /// Cancel the default action and put this text on the clipboard.
    ReplaceClipboard(String),
}

/// Decides which input events to suppress on a protected surface.
#[derive(Debug, Clone)]
pub struct InputGuard {
    blocked: Vec<KeyChord>,
    warning: String,
    attempts: AttemptCounter,
}

impl InputGuard {
    pub fn new(config: &CaptureConfig) -> CaptureResult<Self> {
        Ok(Self {
            blocked: config.shortcuts()?,
            warning: config.warning_text.clone(),
            attempts: AttemptCounter::default(),
        })
    }

    /// Records attempts on `counter` instead of a private one, typically
    /// the controller's so both sources add up.
    pub fn with_counter(mut self, counter: AttemptCounter) -> Self {
        self.attempts = counter;
        self
    }

    pub fn attempts(&self) -> &AttemptCounter {
        &self.attempts
    }

    pub fn is_blocked(&self, chord: &KeyChord) -> bool {
        self.blocked.contains(chord)
    }

    pub fn handle(&self, event: &InputEvent) -> Verdict {
        let verdict = match event {
            InputEvent::Copy | InputEvent::Cut => Verdict::ReplaceClipboard(self.warning.clone()),
            InputEvent::ContextMenu | InputEvent::DragStart | InputEvent::BeforePrint => {
                Verdict::Suppress
            }
            InputEvent::KeyDown(chord) if self.is_blocked(chord) => Verdict::Suppress,
            InputEvent::KeyDown(_) => Verdict::Allow,
        };

        if is_capture_attempt(event) {
            let total = self.attempts.increment();
            debug!("Capture attempt via {event:?} (total {total})");
        }
        verdict
    }
}

fn is_capture_attempt(event: &InputEvent) -> bool {
    match event {
        InputEvent::Copy | InputEvent::Cut | InputEvent::BeforePrint => true,
        InputEvent::KeyDown(chord) => {
            let plain_primary = chord.primary && !chord.shift && !chord.alt;
            chord.key == "PrintScreen" || (plain_primary && matches!(chord.key.as_str(), "C" | "P"))
        }
        InputEvent::ContextMenu | InputEvent::DragStart => false,
    }
}
