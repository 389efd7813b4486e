//! AES-256-GCM content cipher.

use crate::error::{CryptoError, CryptoResult};
use crate::key::EncryptionKey;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// AES-GCM IV size in bytes.
pub const IV_SIZE: usize = 12;

/// AES-GCM authentication tag size in bytes (appended to ciphertext).
pub const TAG_SIZE: usize = 16;

/// Initialization vector. Fresh per encryption, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Iv([u8; IV_SIZE]);

impl Iv {
    pub fn random() -> Self {
        let mut bytes = [0u8; IV_SIZE];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; IV_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds an IV from a slice of exactly [`IV_SIZE`] bytes.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let arr: [u8; IV_SIZE] = bytes.try_into().map_err(|_| CryptoError::InvalidIv {
            expected: IV_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; IV_SIZE] {
        &self.0
    }
}

fn cipher_for(key: &EncryptionKey) -> Aes256Gcm {
    Aes256Gcm::new(key.as_bytes().into())
}

/// Encrypts `plaintext` under `key` with a freshly generated IV.
///
/// Returns the ciphertext (tag appended) and the IV needed to decrypt it.
pub fn encrypt(plaintext: &[u8], key: &EncryptionKey) -> CryptoResult<(Vec<u8>, Iv)> {
    let iv = Iv::random();
    let ciphertext = cipher_for(key)
        .encrypt(Nonce::from_slice(iv.as_bytes()), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;
    Ok((ciphertext, iv))
}

/// Decrypts and authenticates `ciphertext`.
///
/// Fails with [`CryptoError::Decryption`] on a wrong key or any tampering.
pub fn decrypt(ciphertext: &[u8], iv: &Iv, key: &EncryptionKey) -> CryptoResult<Vec<u8>> {
    if ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::Decryption);
    }
    cipher_for(key)
        .decrypt(Nonce::from_slice(iv.as_bytes()), ciphertext)
        .map_err(|_| CryptoError::Decryption)
}
