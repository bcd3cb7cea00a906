use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChopperError {
    #[error("Invalid action symbol: {0} (expected 0..=17)")]
    InvalidAction(u8),

    #[error("Invalid difficulty level: {0} (expected 1 or 2)")]
    InvalidDifficulty(u8),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChopperError>;
