//! readguard: client-side content protection for pay-per-read publishing.
//!
//! Two paths share a device fingerprint:
//!
//! - **Secure downloads.** Content is encrypted under a key derived from the
//!   reader's password and device fingerprint, then wrapped in a package
//!   that only opens on the same device ([`package`]).
//! - **Live reading.** A timed [`capture::ReadingSession`] with blur-on-hide,
//!   input suppression and forensic watermarks ([`capture`],
//!   [`watermark`]).
//!
//! This crate re-exports the component crates and adds the pieces that tie
//! them together: one [`ProtectionConfig`] document and logging setup.

mod config;
mod logging;

pub use config::{ConfigError, ConfigResult, ProtectionConfig};
pub use logging::init_logging;

pub use readguard_capture as capture;
pub use readguard_crypto as crypto;
pub use readguard_device as device;
pub use readguard_package as package;
pub use readguard_watermark as watermark;

use readguard_capture::ReadingSession;
use readguard_watermark::{embed_watermark, ForensicPayload, WatermarkResult};

/// Watermarks `content` with the reader's identity and the session token.
pub fn watermark_for_session(
    content: &str,
    user_id: &str,
    email: &str,
    session: &ReadingSession,
) -> WatermarkResult<String> {
    let payload = ForensicPayload::new(user_id, email, session.token().as_str())?;
    Ok(embed_watermark(content, &payload.to_string()))
}
