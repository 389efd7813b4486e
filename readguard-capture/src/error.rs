use readguard_crypto::CryptoError;
use thiserror::Error;

pub type CaptureResult<T> = Result<T, CaptureError>;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("invalid shortcut: {0}")]
    InvalidShortcut(String),

    #[error("reading session has expired")]
    SessionExpired,

    #[error("device changed during session (similarity {similarity:.2})")]
    DeviceChanged { similarity: f64 },

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}
