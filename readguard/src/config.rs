//! Aggregated configuration.

use readguard_capture::{CaptureConfig, CaptureController, InputGuard, ReadingSurface};
use readguard_crypto::KdfParams;
use readguard_device::{Environment, FingerprintConfig, FingerprintEngine, FingerprintSource};
use readguard_package::{BindingStore, Packager};
use readguard_watermark::OverlayStyle;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// All tunables in one document. Missing sections take their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProtectionConfig {
    pub fingerprint: FingerprintConfig,
    pub kdf: KdfParams,
    pub capture: CaptureConfig,
    pub overlay: OverlayStyle,
}

impl ProtectionConfig {
    /// `<config dir>/readguard/config.json`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("readguard")
            .join("config.json")
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let config = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!("Loaded protection config from {}", path.display());
        Ok(config)
    }

    /// Like [`load`](Self::load) but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let threshold = self.fingerprint.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Invalid(format!(
                "similarity threshold {threshold} is outside [0, 1]"
            )));
        }
        if self.fingerprint.id_length == 0 {
            return Err(ConfigError::Invalid("fingerprint id length is zero".into()));
        }
        self.kdf
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.capture
            .shortcuts()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    pub fn fingerprint_engine<E: Environment>(&self, env: E) -> FingerprintEngine<E> {
        FingerprintEngine::with_config(env, self.fingerprint)
    }

    pub fn packager(
        &self,
        fingerprints: Arc<dyn FingerprintSource>,
        bindings: Arc<dyn BindingStore>,
    ) -> ConfigResult<Packager> {
        Packager::new(fingerprints, bindings)
            .with_kdf(self.kdf)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn capture_controller(&self, surface: Arc<dyn ReadingSurface>) -> CaptureController {
        CaptureController::new(surface, &self.capture)
    }

    pub fn input_guard(&self) -> ConfigResult<InputGuard> {
        InputGuard::new(&self.capture).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
