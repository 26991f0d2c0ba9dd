use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Malformed event JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
