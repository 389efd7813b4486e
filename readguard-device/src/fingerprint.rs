//! Fingerprint computation and comparison.

use crate::environment::{AudioProbe, CanvasProbe, Environment};
use crate::error::ProbeResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Separator placed between components before hashing.
pub const COMPONENT_DELIMITER: &str = "|";

/// Hex characters kept from the SHA-256 digest.
pub const FINGERPRINT_ID_LENGTH: usize = 32;

/// Hex characters kept from canvas/audio sub-hashes.
const SUB_HASH_LENGTH: usize = 16;

/// Number of components collected per fingerprint.
pub const COMPONENT_COUNT: usize = 13;

/// Live sessions treat fingerprints at or above this similarity as the
/// same device.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Fingerprint tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FingerprintConfig {
    /// Minimum similarity for live-session re-validation.
    pub similarity_threshold: f64,
    /// Hex characters kept as the identifier (capped at 64).
    pub id_length: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            id_length: FINGERPRINT_ID_LENGTH,
        }
    }
}

/// A computed device fingerprint.
///
/// `components` keeps the ordered inputs so two fingerprints can be scored
/// for similarity; `id` is the hashed identifier used for exact binding.
/// Equality ignores `collected_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceFingerprint {
    id: String,
    #[serde(default)]
    components: Vec<String>,
    collected_at: DateTime<Utc>,
}

impl DeviceFingerprint {
    /// Wraps a precomputed identifier (e.g. one stored in package metadata).
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            components: Vec::new(),
            collected_at: Utc::now(),
        }
    }

    /// Builds a fingerprint from ordered components.
    pub fn from_components(components: Vec<String>, id_length: usize) -> Self {
        let id = hash_components(&components, id_length);
        Self {
            id,
            components,
            collected_at: Utc::now(),
        }
    }

    /// Returns the stable identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the ordered component strings.
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Returns when the signals were collected.
    #[must_use]
    pub fn collected_at(&self) -> DateTime<Utc> {
        self.collected_at
    }

    /// Exact identifier match, as required for package binding.
    #[must_use]
    pub fn matches(&self, other: &DeviceFingerprint) -> bool {
        self.id == other.id
    }

    /// Component-wise similarity in `[0, 1]`.
    ///
    /// Missing components on either side count as mismatches. Fingerprints
    /// carrying no components (built with [`DeviceFingerprint::from_id`])
    /// fall back to comparing identifiers.
    #[must_use]
    pub fn similarity(&self, other: &DeviceFingerprint) -> f64 {
        let total = self.components.len().max(other.components.len());
        if total == 0 {
            return if self.matches(other) { 1.0 } else { 0.0 };
        }
        let matches = self
            .components
            .iter()
            .zip(&other.components)
            .filter(|(a, b)| a == b)
            .count();
        matches as f64 / total as f64
    }

    /// Looser check used when re-validating long-lived reading sessions.
    #[must_use]
    pub fn is_same_device(&self, other: &DeviceFingerprint, threshold: f64) -> bool {
        self.similarity(other) >= threshold
    }
}

impl PartialEq for DeviceFingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.components == other.components
    }
}

impl Eq for DeviceFingerprint {}

/// Anything that can report the current device's fingerprint.
pub trait FingerprintSource: Send + Sync {
    fn current_fingerprint(&self) -> DeviceFingerprint;
}

/// A source that always reports the same identifier.
///
/// Used when the fingerprint was computed elsewhere (e.g. by the UI
/// bridge) and in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedFingerprint {
    id: String,
}

impl FixedFingerprint {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl FingerprintSource for FixedFingerprint {
    fn current_fingerprint(&self) -> DeviceFingerprint {
        DeviceFingerprint::from_id(self.id.clone())
    }
}

/// Computes fingerprints from an [`Environment`].
pub struct FingerprintEngine<E> {
    env: E,
    config: FingerprintConfig,
}

impl<E: Environment> FingerprintEngine<E> {
    pub fn new(env: E) -> Self {
        Self::with_config(env, FingerprintConfig::default())
    }

    pub fn with_config(env: E, config: FingerprintConfig) -> Self {
        Self { env, config }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Computes the fingerprint of the current environment.
    pub fn compute(&self) -> DeviceFingerprint {
        DeviceFingerprint::from_components(collect_components(&self.env), self.config.id_length)
    }
}

impl<E: Environment + Send + Sync> FingerprintSource for FingerprintEngine<E> {
    fn current_fingerprint(&self) -> DeviceFingerprint {
        self.compute()
    }
}

/// Computes a fingerprint with the default configuration.
pub fn compute_fingerprint<E: Environment + ?Sized>(env: &E) -> DeviceFingerprint {
    DeviceFingerprint::from_components(collect_components(env), FINGERPRINT_ID_LENGTH)
}

fn or_sentinel<T>(
    probe: &str,
    sentinel: &str,
    value: ProbeResult<T>,
    render: impl FnOnce(T) -> String,
) -> String {
    match value {
        Ok(v) => render(v),
        Err(e) => {
            debug!("fingerprint probe {probe} degraded to {sentinel}: {e}");
            sentinel.to_string()
        }
    }
}

/// Collects the ordered component list. Never fails.
fn collect_components<E: Environment + ?Sized>(env: &E) -> Vec<String> {
    let mut components = Vec::with_capacity(COMPONENT_COUNT);

    match env.display() {
        Ok(d) => {
            components.push(format!("{}x{}", d.width, d.height));
            components.push(d.color_depth.to_string());
            components.push(d.pixel_ratio.to_string());
        }
        Err(e) => {
            debug!("fingerprint probe display degraded to no-display: {e}");
            components.extend(std::iter::repeat_n("no-display".to_string(), 3));
        }
    }

    components.push(or_sentinel("locale", "no-locale", env.locale(), |s| s));
    components.push(or_sentinel("timezone", "no-timezone", env.timezone(), |s| s));
    components.push(or_sentinel("platform", "no-platform", env.platform(), |s| s));
    components.push(or_sentinel("cpus", "no-cpus", env.logical_cpus(), |n| n.to_string()));
    components.push(or_sentinel("memory", "no-memory", env.device_memory_gb(), |m| m.to_string()));
    components.push(or_sentinel("touch", "no-touch", env.touch_support(), |t| t.to_string()));

    match env.gpu() {
        Ok(gpu) => {
            components.push(gpu.vendor);
            components.push(gpu.renderer);
        }
        Err(e) => {
            debug!("fingerprint probe webgl degraded to no-webgl: {e}");
            components.extend(std::iter::repeat_n("no-webgl".to_string(), 2));
        }
    }

    components.push(or_sentinel(
        "canvas",
        "no-canvas",
        env.render_canvas(&CanvasProbe::STANDARD),
        |pixels| sub_hash(&pixels),
    ));
    components.push(or_sentinel(
        "audio",
        "no-audio",
        env.render_audio(&AudioProbe::STANDARD),
        |samples| {
            let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
            sub_hash(&bytes)
        },
    ));

    components
}

fn sub_hash(bytes: &[u8]) -> String {
    let mut digest = hex::encode(Sha256::digest(bytes));
    digest.truncate(SUB_HASH_LENGTH);
    digest
}

fn hash_components(components: &[String], id_length: usize) -> String {
    let joined = components.join(COMPONENT_DELIMITER);
    let mut digest = hex::encode(Sha256::digest(joined.as_bytes()));
    digest.truncate(id_length.min(64));
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(components: &[&str]) -> DeviceFingerprint {
        DeviceFingerprint::from_components(
            components.iter().map(|c| c.to_string()).collect(),
            FINGERPRINT_ID_LENGTH,
        )
    }

    #[test]
    fn id_is_truncated_sha256_of_joined_components() {
        let expected = hex::encode(Sha256::digest(b"a|b|c"));
        assert_eq!(fp(&["a", "b", "c"]).id(), &expected[..32]);
    }

    #[test]
    fn id_length_is_capped_at_full_digest() {
        let long = DeviceFingerprint::from_components(vec!["x".into()], 500);
        assert_eq!(long.id().len(), 64);
    }

    #[test]
    fn similarity_counts_matching_positions() {
        let a = fp(&["1", "2", "3", "4"]);
        let b = fp(&["1", "2", "x", "4"]);
        assert!((a.similarity(&b) - 0.75).abs() < f64::EPSILON);
        assert!(a.is_same_device(&b, DEFAULT_SIMILARITY_THRESHOLD));
    }

    #[test]
    fn similarity_penalizes_missing_components() {
        let a = fp(&["1", "2", "3", "4"]);
        let b = fp(&["1", "2"]);
        assert!((a.similarity(&b) - 0.5).abs() < f64::EPSILON);
        assert!(!a.is_same_device(&b, DEFAULT_SIMILARITY_THRESHOLD));
    }

    #[test]
    fn id_only_fingerprints_compare_by_id() {
        let a = DeviceFingerprint::from_id("abc");
        assert_eq!(a.similarity(&DeviceFingerprint::from_id("abc")), 1.0);
        assert_eq!(a.similarity(&DeviceFingerprint::from_id("abd")), 0.0);
    }

    #[test]
    fn fixed_source_reports_its_id() {
        let source = FixedFingerprint::new("deadbeef");
        assert_eq!(source.current_fingerprint().id(), "deadbeef");
    }
}
