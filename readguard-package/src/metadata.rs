//! Package metadata.

use crate::error::{PackageError, PackageResult};
use chrono::{DateTime, Utc};
use readguard_crypto::{Iv, KdfParams, Salt};
use serde::{Deserialize, Serialize};

/// Version written by this crate: per-package random salt.
pub const FORMAT_VERSION: &str = "2.0";

/// Original version: application-wide salt, PBKDF2 defaults.
pub const LEGACY_FORMAT_VERSION: &str = "1.0";

/// Who owns the content and what it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInfo {
    pub user_id: String,
    pub content_id: String,
    pub title: String,
}

/// JSON header of a protected package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    pub version: String,
    pub content_id: String,
    pub content_title: String,
    pub user_id: String,
    /// Fingerprint the package is bound to.
    pub device_fingerprint: String,
    pub created_at: DateTime<Utc>,
    /// The 12 IV bytes as a JSON number array.
    pub iv: Vec<u8>,
    pub encrypted_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf: Option<KdfParams>,
}

impl PackageMetadata {
    /// Returns the embedded IV.
    pub fn iv(&self) -> PackageResult<Iv> {
        Iv::from_slice(&self.iv).map_err(|e| PackageError::Malformed(e.to_string()))
    }

    /// Returns the salt and KDF to re-derive the key with.
    ///
    /// Legacy packages carry neither and use the application salt. KDF
    /// parameters outside the supported cost range are malformed.
    pub fn key_params(&self) -> PackageResult<(Salt, KdfParams)> {
        match self.version.as_str() {
            LEGACY_FORMAT_VERSION => Ok((Salt::application(), KdfParams::default())),
            FORMAT_VERSION => {
                let salt = self
                    .salt
                    .as_deref()
                    .ok_or_else(|| PackageError::Malformed("missing salt".to_string()))?;
                let salt =
                    Salt::from_slice(salt).map_err(|e| PackageError::Malformed(e.to_string()))?;
                let kdf = self.kdf.unwrap_or_default();
                kdf.validate().map_err(|e| PackageError::Malformed(e.to_string()))?;
                Ok((salt, kdf))
            }
            other => Err(PackageError::Malformed(format!("unsupported version {other}"))),
        }
    }
}
