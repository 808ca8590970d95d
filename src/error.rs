use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading, saving and importing editor state.
#[derive(Debug, Error)]
pub enum MapError {
    /// File I/O error.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// JSON parse error in a file.
    #[error("JSON parse error in {}: {source}", .path.display())]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// JSON parse or encode error on in-memory text.
    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Unsupported file format (non-JSON).
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    /// Snapshot written by an incompatible version.
    #[error("Unsupported snapshot version {found} (this build reads up to {supported})")]
    UnsupportedVersion {
        /// Version tag found in the snapshot.
        found: u32,
        /// Newest version understood.
        supported: u32,
    },
    /// Snapshot is structurally broken.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
    /// Configuration values make no sense.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
