use storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<StorageError> for BotError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(what) => BotError::NotFound(what),
            other => BotError::Database(other.to_string()),
        }
    }
}

impl BotError {
    /// True when the error is a lookup miss; handlers suppress the operation
    /// instead of reporting these.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BotError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
