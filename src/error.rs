//! Error kinds for the packaging pipeline.
//!
//! Each kind is the terminal state for one pipeline stage. Operations
//! inside the stages report plain `anyhow` errors with context; the
//! pipeline attaches one of these kinds on top of the chain, so callers
//! can tell the failing stage apart with `Error::downcast_ref` while
//! still printing the full cause chain.

use std::path::PathBuf;
use thiserror::Error;

/// Terminal failure of one packaging run, tagged by the failing stage.
#[derive(Debug, Error)]
pub enum PackagingError {
    /// The scratch workspace could not be created.
    #[error("failed to initialize scratch workspace")]
    Initialization,

    /// The input application directory is missing or not readable.
    #[error("application directory '{}' is missing or not readable", .path.display())]
    SourceNotFound { path: PathBuf },

    /// Zip staging or tar/gzip packaging failed.
    #[error("failed to encode droplet archive")]
    Encoding,

    /// The staging metadata descriptor could not be written.
    #[error("failed to write staging metadata")]
    MetadataWrite,
}
