use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid message data: {0}")]
    Validation(String),
    #[error("DutyCalls authentication failed: {0}")]
    Authentication(String),
    #[error("DutyCalls rejected the request: {0}")]
    Request(String),
    #[error("failed to reach DutyCalls: {0}")]
    Transport(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    /// Remote failures the notification service logs instead of returning.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Authentication(_) | AppError::Request(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
