use thiserror::Error;

pub type WatermarkResult<T> = Result<T, WatermarkError>;

#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("invalid forensic payload: {0}")]
    InvalidPayload(String),
}
