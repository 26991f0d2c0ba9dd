use storage::StorageError;
use thiserror::Error;

/// Failure kinds surfaced to the host. Setup-time kinds (`Config`, `Setup`, `InvalidState`)
/// leave the logger unusable; `Persistence` affects a single event only.
#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Setup error: {0}")]
    Setup(#[source] StorageError),

    #[error("Setup error: logger is {0}, initialize() requires an uninitialized logger")]
    InvalidState(&'static str),

    #[error("Persistence error: {0}")]
    Persistence(#[source] StorageError),

    #[error("Logger is not ready (state: {0})")]
    NotReady(&'static str),
}

impl LoggerError {
    /// True when `handle` failed because the message id was already stored.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, LoggerError::Persistence(e) if e.is_duplicate())
    }

    /// True for failures raised by `initialize`.
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            LoggerError::Config(_) | LoggerError::Setup(_) | LoggerError::InvalidState(_)
        )
    }
}
