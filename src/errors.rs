use std::result::Result as StdResult;

use thiserror::Error;

use crate::ledger::ValidationError;

/// Unified error type for the storage, scheduling and service layers.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read `{key}`: {message}")]
    StorageRead { key: String, message: String },
    #[error("failed to write `{key}`: {message}")]
    StorageWrite { key: String, message: String },
    #[error("Invalid template: {0}")]
    Validation(#[from] ValidationError),
    #[error("Recurring template not found: {0}")]
    TemplateNotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn read(key: &str, message: impl ToString) -> Self {
        CoreError::StorageRead {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    pub fn write(key: &str, message: impl ToString) -> Self {
        CoreError::StorageWrite {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    /// True for failures of the underlying key-value store.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            CoreError::StorageRead { .. } | CoreError::StorageWrite { .. }
        )
    }
}

pub type Result<T> = StdResult<T, CoreError>;

/// Errors that end the interactive shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}
