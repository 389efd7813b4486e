//! The rendering surface the controller acts on.

use serde::{Deserialize, Serialize};

/// Whether content is currently shown or blurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapturePhase {
    #[default]
    Visible,
    Blurred,
}

/// Visibility and focus changes reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceEvent {
    VisibilityChanged { hidden: bool },
    FocusChanged { focused: bool },
}

impl SurfaceEvent {
    /// True if the event means the reader can no longer see the surface.
    pub fn conceals(&self) -> bool {
        match *self {
            Self::VisibilityChanged { hidden } => hidden,
            Self::FocusChanged { focused } => !focused,
        }
    }
}

/// A surface that can be blurred, e.g. the element holding article text.
///
/// Both calls must be idempotent and cheap; they run while the controller
/// holds its state lock.
pub trait ReadingSurface: Send + Sync {
    fn apply_blur(&self);
    fn remove_blur(&self);
}
