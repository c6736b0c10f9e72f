use crate::persistence::PersistenceError;
use thiserror::Error;

/// Malformed client input: time or date text, phase tags, weekday names.
///
/// Carries a human-readable message that names the offending record, e.g.
/// `employee 'Ada' week A Monday slot #1: invalid end time '25:00'`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prefixes the message with the record the error was found in.
    pub fn within(self, context: impl AsRef<str>) -> Self {
        Self {
            message: format!("{}: {}", context.as_ref(), self.message),
        }
    }
}

#[derive(Debug, Error)]
pub enum RotaError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid month: '{0}'")]
    InvalidMonth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("read error: {0}")]
    Read(PersistenceError),
    #[error("write error: {0}")]
    Write(PersistenceError),
}

impl RotaError {
    /// Maps a store read failure, turning a missing record into `NotFound`.
    pub fn read(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(what) => RotaError::NotFound(what),
            other => RotaError::Read(other),
        }
    }

    pub fn write(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(what) => RotaError::NotFound(what),
            other => RotaError::Write(other),
        }
    }
}

pub type RotaResult<T> = Result<T, RotaError>;
