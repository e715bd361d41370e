//! Error types for the critter core library.
//!
//! Selection and memory mutation never surface these to callers; they are
//! returned only from explicitly fallible administrative APIs (opening a
//! backend, loading configuration, flushing the store).

use thiserror::Error;

/// Top-level error type for all critter operations.
#[derive(Error, Debug)]
pub enum CritterError {
    /// A memory with the given ID was not found.
    #[error("Memory not found: {0}")]
    MemoryNotFound(crate::MemoryId),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, CritterError>;
