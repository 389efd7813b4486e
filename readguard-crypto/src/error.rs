//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in key derivation or content encryption.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Authentication failed. A wrong key and tampered bytes are
    /// indistinguishable here.
    #[error("decryption failed (wrong key or tampered data)")]
    Decryption,

    #[error("invalid IV length: expected {expected}, got {actual}")]
    InvalidIv { expected: usize, actual: usize },

    #[error("invalid salt length: expected {expected}, got {actual}")]
    InvalidSalt { expected: usize, actual: usize },

    #[error("invalid KDF parameters: {0}")]
    InvalidParams(String),
}
