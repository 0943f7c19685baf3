//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while opening or syncing a mapped region.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backing file path was empty.
    #[error("backing file path is empty")]
    EmptyPath,

    /// The backing file did not reach the requested length after zero-extension.
    #[error("backing file size mismatch: expected at least {expected} bytes, got {actual}")]
    SizeMismatch {
        /// The requested region length.
        expected: u64,
        /// The observed file size.
        actual: u64,
    },
}
