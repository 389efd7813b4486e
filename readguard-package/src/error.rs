//! Package error types.

use readguard_crypto::CryptoError;
use thiserror::Error;

/// Result type for package operations.
pub type PackageResult<T> = Result<T, PackageError>;

/// Errors that can occur creating or opening a protected package.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("this file is locked to a different device")]
    DeviceMismatch,

    /// Wrong password or corrupted bytes; authenticated decryption cannot
    /// tell the two apart.
    #[error("incorrect password or corrupted file")]
    BadPassword,

    #[error("password must not be empty")]
    EmptyPassword,

    #[error("malformed package: {0}")]
    Malformed(String),

    #[error("device binding store error: {0}")]
    Binding(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("background task failed: {0}")]
    Task(String),
}
