//! Device fingerprinting for readguard.
//!
//! Derives a stable per-device identifier from environment signals:
//! - Display geometry, locale, timezone and platform strings
//! - Hardware hints (logical CPUs, device memory, touch support)
//! - GPU vendor/renderer and hashes of canvas and audio render output
//!
//! # Degrade gracefully
//!
//! Fingerprinting never fails. A probe that is unsupported or errors is
//! replaced by a sentinel component (`"no-webgl"`, `"no-audio"`, ...) so a
//! partial fingerprint is still produced on restricted devices.
//!
//! # Not a security boundary
//!
//! The fingerprint is a heuristic identifier. It is reproducible across
//! sessions on the same device but it is not secret and not unguessable.
//! Callers combine it with a password (see `readguard-crypto`) rather than
//! relying on it alone.

mod environment;
mod error;
mod fingerprint;

pub use environment::{
    AudioProbe, CanvasProbe, DisplayInfo, Environment, EnvironmentSnapshot, GpuInfo,
    HostEnvironment,
};
pub use error::{ProbeError, ProbeResult};
pub use fingerprint::{
    compute_fingerprint, DeviceFingerprint, FingerprintConfig, FingerprintEngine,
    FingerprintSource, FixedFingerprint, COMPONENT_COUNT, COMPONENT_DELIMITER,
    DEFAULT_SIMILARITY_THRESHOLD, FINGERPRINT_ID_LENGTH,
};
