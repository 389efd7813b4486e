//! Key derivation.

use crate::error::{CryptoError, CryptoResult};
use crate::token::SessionToken;
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use zeroize::{Zeroizing, ZeroizeOnDrop};

/// Derived key size in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// Salt size in bytes.
pub const SALT_SIZE: usize = 16;

/// PBKDF2 is never run below this many rounds.
pub const MIN_PBKDF2_ITERATIONS: u32 = 100_000;

/// PBKDF2 is never run above this many rounds.
pub const MAX_PBKDF2_ITERATIONS: u32 = 10_000_000;

/// Argon2 memory ceiling in KiB (1 GiB).
pub const MAX_ARGON2_MEMORY_KIB: u32 = 1024 * 1024;

/// Argon2 pass ceiling.
pub const MAX_ARGON2_ITERATIONS: u32 = 16;

/// Argon2 lane ceiling.
pub const MAX_ARGON2_PARALLELISM: u32 = 16;

/// Application-wide salt used when a package carries none.
pub const APPLICATION_SALT: [u8; SALT_SIZE] = *b"readguard-pkg-v1";

/// Domain-separated salt for live-session keys.
const SESSION_SALT: [u8; SALT_SIZE] = *b"readguard-live-1";

/// A 256-bit symmetric key. Zeroized on drop and never serialized.
#[derive(Clone, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}

/// KDF salt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// Generates a random salt.
    pub fn random() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// The fixed application salt.
    pub fn application() -> Self {
        Self(APPLICATION_SALT)
    }

    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds a salt from a slice of exactly [`SALT_SIZE`] bytes.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let arr: [u8; SALT_SIZE] = bytes.try_into().map_err(|_| CryptoError::InvalidSalt {
            expected: SALT_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

impl Default for Salt {
    fn default() -> Self {
        Self::application()
    }
}

/// Key derivation function and its cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm")]
pub enum KdfParams {
    #[serde(rename = "pbkdf2-sha256")]
    Pbkdf2Sha256 { iterations: u32 },

    #[serde(rename = "argon2id", rename_all = "camelCase")]
    Argon2id {
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    },
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::Pbkdf2Sha256 {
            iterations: MIN_PBKDF2_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Interactive-strength Argon2id (19 MiB, 2 passes).
    pub fn argon2id() -> Self {
        Self::Argon2id {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }

    /// Rejects parameters weaker than the supported floor or costlier than
    /// the supported ceiling. Packages carry their own parameters, so both
    /// bounds apply to untrusted input.
    pub fn validate(&self) -> CryptoResult<()> {
        match *self {
            Self::Pbkdf2Sha256 { iterations } if iterations < MIN_PBKDF2_ITERATIONS => {
                Err(CryptoError::InvalidParams(format!(
                    "PBKDF2 needs at least {MIN_PBKDF2_ITERATIONS} iterations, got {iterations}"
                )))
            }
            Self::Pbkdf2Sha256 { iterations } if iterations > MAX_PBKDF2_ITERATIONS => {
                Err(CryptoError::InvalidParams(format!(
                    "PBKDF2 allows at most {MAX_PBKDF2_ITERATIONS} iterations, got {iterations}"
                )))
            }
            Self::Pbkdf2Sha256 { .. } => Ok(()),
            Self::Argon2id {
                memory_kib,
                iterations,
                parallelism,
            } => {
                if memory_kib > MAX_ARGON2_MEMORY_KIB
                    || iterations > MAX_ARGON2_ITERATIONS
                    || parallelism > MAX_ARGON2_PARALLELISM
                {
                    return Err(CryptoError::InvalidParams(format!(
                        "Argon2 cost m={memory_kib} t={iterations} p={parallelism} exceeds \
                         m={MAX_ARGON2_MEMORY_KIB} t={MAX_ARGON2_ITERATIONS} p={MAX_ARGON2_PARALLELISM}"
                    )));
                }
                argon2_params(memory_kib, iterations, parallelism).map(|_| ())
            }
        }
    }
}

fn argon2_params(memory_kib: u32, iterations: u32, parallelism: u32) -> CryptoResult<Params> {
    Params::new(memory_kib, iterations, parallelism, Some(KEY_SIZE))
        .map_err(|e| CryptoError::InvalidParams(e.to_string()))
}

/// Derives a key from a password and a device fingerprint.
///
/// Deterministic: identical inputs always yield the identical key.
pub fn derive_key(
    password: &str,
    fingerprint: &str,
    salt: &Salt,
    params: &KdfParams,
) -> CryptoResult<EncryptionKey> {
    params.validate()?;

    let material = Zeroizing::new(format!("{password}|{fingerprint}"));
    let mut output = [0u8; KEY_SIZE];

    match *params {
        KdfParams::Pbkdf2Sha256 { iterations } => {
            pbkdf2::pbkdf2_hmac::<Sha256>(
                material.as_bytes(),
                salt.as_bytes(),
                iterations,
                &mut output,
            );
        }
        KdfParams::Argon2id {
            memory_kib,
            iterations,
            parallelism,
        } => {
            let argon2 = Argon2::new(
                Algorithm::Argon2id,
                Version::V0x13,
                argon2_params(memory_kib, iterations, parallelism)?,
            );
            argon2
                .hash_password_into(material.as_bytes(), salt.as_bytes(), &mut output)
                .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
        }
    }

    Ok(EncryptionKey(output))
}

/// Derives the live-session key from a session token and the fingerprint.
///
/// Uses a salt distinct from package keys so the two paths never share a
/// key even if a token were reused as a password.
pub fn derive_session_key(token: &SessionToken, fingerprint: &str) -> CryptoResult<EncryptionKey> {
    derive_key(
        token.as_str(),
        fingerprint,
        &Salt::from_bytes(SESSION_SALT),
        &KdfParams::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let salt = Salt::application();
        let a = derive_key("pw", "fp", &salt, &KdfParams::default()).unwrap();
        let b = derive_key("pw", "fp", &salt, &KdfParams::default()).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn fingerprint_and_password_both_matter() {
        let salt = Salt::application();
        let params = KdfParams::default();
        let base = derive_key("pw", "fp-1", &salt, &params).unwrap();
        let other_device = derive_key("pw", "fp-2", &salt, &params).unwrap();
        let other_password = derive_key("pw2", "fp-1", &salt, &params).unwrap();
        assert_ne!(base.as_bytes(), other_device.as_bytes());
        assert_ne!(base.as_bytes(), other_password.as_bytes());
    }

    #[test]
    fn salt_changes_key() {
        let params = KdfParams::default();
        let a = derive_key("pw", "fp", &Salt::application(), &params).unwrap();
        let b = derive_key("pw", "fp", &Salt::random(), &params).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn weak_pbkdf2_rejected() {
        let params = KdfParams::Pbkdf2Sha256 { iterations: 1_000 };
        assert!(matches!(
            derive_key("pw", "fp", &Salt::application(), &params),
            Err(CryptoError::InvalidParams(_))
        ));
    }

    #[test]
    fn argon2id_derivation() {
        let params = KdfParams::Argon2id {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        let a = derive_key("pw", "fp", &Salt::application(), &params).unwrap();
        let b = derive_key("pw", "fp", &Salt::application(), &params).unwrap();
        let pbkdf2 = derive_key("pw", "fp", &Salt::application(), &KdfParams::default()).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_ne!(a.as_bytes(), pbkdf2.as_bytes());
    }

    #[test]
    fn invalid_argon2_params_rejected() {
        let params = KdfParams::Argon2id {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn excessive_cost_rejected() {
        let pbkdf2 = KdfParams::Pbkdf2Sha256 { iterations: u32::MAX };
        assert!(matches!(pbkdf2.validate(), Err(CryptoError::InvalidParams(_))));
        assert!(KdfParams::Pbkdf2Sha256 { iterations: MAX_PBKDF2_ITERATIONS }
            .validate()
            .is_ok());

        let argon = KdfParams::Argon2id {
            memory_kib: 4_000_000_000,
            iterations: 2,
            parallelism: 1,
        };
        assert!(matches!(argon.validate(), Err(CryptoError::InvalidParams(_))));
        let passes = KdfParams::Argon2id {
            memory_kib: 19 * 1024,
            iterations: u32::MAX,
            parallelism: 1,
        };
        assert!(passes.validate().is_err());
        assert!(KdfParams::argon2id().validate().is_ok());
    }

    #[test]
    fn salt_from_slice_checks_length() {
        assert!(Salt::from_slice(&[0u8; SALT_SIZE]).is_ok());
        assert!(matches!(
            Salt::from_slice(&[0u8; 8]),
            Err(CryptoError::InvalidSalt { expected: 16, actual: 8 })
        ));
    }

    #[test]
    fn session_key_differs_from_package_key() {
        let token = SessionToken::generate();
        let session = derive_session_key(&token, "fp").unwrap();
        let package = derive_key(token.as_str(), "fp", &Salt::application(), &KdfParams::default())
            .unwrap();
        assert_ne!(session.as_bytes(), package.as_bytes());
    }

    #[test]
    fn debug_never_prints_key_material() {
        let key = derive_key("pw", "fp", &Salt::application(), &KdfParams::default()).unwrap();
        assert_eq!(format!("{key:?}"), "EncryptionKey([REDACTED])");
    }

    #[test]
    fn kdf_params_json_shape() {
        let json = serde_json::to_string(&KdfParams::default()).unwrap();
        assert_eq!(json, r#"{"algorithm":"pbkdf2-sha256","iterations":100000}"#);

        let argon: KdfParams = serde_json::from_str(
            r#"{"algorithm":"argon2id","memoryKib":19456,"iterations":2,"parallelism":1}"#,
        )
        .unwrap();
        assert_eq!(argon, KdfParams::argon2id());
    }
}
