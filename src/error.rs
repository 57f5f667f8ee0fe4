//! Error types for loading and analysis.
//!
//! Analysis itself is total over any byte sequence; the only fallible step is
//! getting the bytes into memory in the first place.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for fallible fathom operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while preparing a file for analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The file could not be opened, read, or mapped.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The file exceeds the configured input limit.
    #[error("{} is {size} bytes, exceeding the {limit} byte limit", path.display())]
    InputTooLarge {
        /// Path that was requested.
        path: PathBuf,
        /// Actual file size in bytes.
        size: u64,
        /// Configured maximum.
        limit: u64,
    },
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
