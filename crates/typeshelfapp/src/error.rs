use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::validation::{FontValidationError, NameValidationError, TemplateValidationError};

#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Machine-readable classification of a [`ShelfError`].
///
/// Callers at the boundary (CLI, HTTP glue) switch on this instead of
/// matching message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Persistence,
    Io,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Persistence => "persistence",
            ErrorKind::Io => "io",
            ErrorKind::Config => "config",
        };
        f.write_str(label)
    }
}

impl ShelfError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShelfError::Validation(_) => ErrorKind::Validation,
            ShelfError::NotFound(_) => ErrorKind::NotFound,
            ShelfError::Conflict(_) => ErrorKind::Conflict,
            ShelfError::Database(_) | ShelfError::Persistence(_) => ErrorKind::Persistence,
            ShelfError::Io(_) | ShelfError::Serialization(_) => ErrorKind::Io,
            ShelfError::Config(_) => ErrorKind::Config,
        }
    }
}

impl From<FontValidationError> for ShelfError {
    fn from(err: FontValidationError) -> Self {
        ShelfError::Validation(err.to_string())
    }
}

impl From<TemplateValidationError> for ShelfError {
    fn from(err: TemplateValidationError) -> Self {
        ShelfError::Validation(err.to_string())
    }
}

impl From<NameValidationError> for ShelfError {
    fn from(err: NameValidationError) -> Self {
        ShelfError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShelfError>;
