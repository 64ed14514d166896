// src/error.rs

use thiserror::Error;

/// Core error types for pacdb
#[derive(Error, Debug)]
pub enum Error {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive or descriptor decode failure
    #[error("Decode error: {0}")]
    Decode(String),

    /// Dependency specifier that does not match the pacman grammar
    #[error("Invalid dependency specifier: {0}")]
    InvalidDependency(String),
}

/// Result type alias using pacdb's Error type
pub type Result<T> = std::result::Result<T, Error>;
