//! Capture resistance for live reading surfaces.
//!
//! - [`CaptureController`] blurs the surface when it is hidden or loses
//!   focus and unblurs it only after a short delay.
//! - [`InputGuard`] decides which clipboard, print, drag and keyboard
//!   events the host should suppress.
//! - [`ReadingSession`] ties a live session token to the reader's device.
//!
//! All of this is deterrence. A determined reader with a second camera wins;
//! the point is to make casual copying tedious and to count attempts.

mod config;
mod controller;
mod error;
mod input;
mod session;
mod surface;

pub use config::{CaptureConfig, DEFAULT_UNBLUR_DELAY_MS, DEFAULT_WARNING_TEXT};
pub use controller::{
    setup_anti_screenshot, AttemptCallback, AttemptCounter, CaptureController, CaptureHandle,
};
pub use error::{CaptureError, CaptureResult};
pub use input::{InputEvent, InputGuard, KeyChord, Verdict, DEFAULT_BLOCKED_SHORTCUTS};
pub use session::ReadingSession;
pub use surface::{CapturePhase, ReadingSurface, SurfaceEvent};
