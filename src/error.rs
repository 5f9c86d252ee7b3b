//! Error types.
//!
//! Collection never fails: a command that cannot run yields empty text and
//! the affected record stays empty. Only persisting the results can fail.

use std::io;
use std::path::PathBuf;

/// Errors raised while writing snapshot or metrics files.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Creating or writing a file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The snapshot could not be serialized.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Renaming the temporary file onto its destination failed.
    #[error("failed to replace {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, AuditError>;
