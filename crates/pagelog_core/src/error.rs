//! Error types for pagelog core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in pagelog core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Mapped-region backend error.
    #[error("storage error: {0}")]
    Storage(#[from] pagelog_storage::StorageError),

    /// I/O error while writing the target file.
    ///
    /// Pending content stays marked as buffered in the region, so a later
    /// flush retries with the same bytes.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The target path is unusable (empty, too long for the header path
    /// field, or not valid UTF-8).
    #[error("invalid target path: {message}")]
    InvalidPath {
        /// Description of what is wrong with the path.
        message: String,
    },

    /// A header field failed the plausibility guard.
    #[error("header corrupted: {message}")]
    HeaderCorrupted {
        /// Description of the corruption.
        message: String,
    },

    /// An append would overrun the content area of the region.
    #[error("content capacity exceeded: {pending} pending + {requested} requested > {capacity}")]
    CapacityExceeded {
        /// Bytes already buffered.
        pending: usize,
        /// Bytes the append asked to add.
        requested: usize,
        /// Physical capacity of the content area.
        capacity: usize,
    },

    /// A flush was requested before a target path was configured.
    #[error("no target path configured")]
    NoTargetPath,
}

impl CoreError {
    /// Creates an invalid path error.
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::InvalidPath {
            message: message.into(),
        }
    }

    /// Creates a header corruption error.
    pub fn header_corrupted(message: impl Into<String>) -> Self {
        Self::HeaderCorrupted {
            message: message.into(),
        }
    }
}
