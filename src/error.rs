use thiserror::Error;

#[derive(Debug, Error)]
pub enum SipError {
    #[error("investment frequency must be 1, 2, 4 or 12 periods per year, got {0}")]
    InvalidFrequency(u32),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SipError>;
