//! The packaging pipeline: zip staging, droplet packaging, metadata.
//!
//! Stages run strictly in sequence because each consumes the previous
//! stage's filesystem output:
//!
//! ```text
//! app dir ──stage_zip──▶ workspace/app.zip ──package_tar_gz──▶ droplet
//!                                                              metadata
//! ```
//!
//! The scratch workspace is released on every exit path; a cleanup
//! failure is reported as a warning and never overrides the pipeline
//! result.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::archive::targz::package_tar_gz;
use crate::archive::zip::stage_zip;
use crate::error::PackagingError;
use crate::metadata::emit_metadata;
use crate::workspace::ScopedWorkspace;

/// Name of the staged zip inside the workspace, and thus the droplet's
/// sole top-level entry. Fixed by the consuming platform.
pub const STAGED_ZIP_NAME: &str = "app.zip";

/// Immutable input for a single packaging run.
#[derive(Debug, Clone)]
pub struct PackagingRequest {
    /// Directory of already-built application artifacts.
    pub app_dir: PathBuf,
    /// Target path for the gzip-compressed tar droplet.
    pub output_droplet: PathBuf,
    /// Target path for the JSON staging metadata.
    pub output_metadata: PathBuf,
    /// Command the platform uses to launch the application.
    pub start_command: String,
}

/// Run the packaging pipeline for `request`.
///
/// Produces the droplet at `request.output_droplet` and the staging
/// metadata at `request.output_metadata`. On failure the error chain
/// carries a [`PackagingError`] naming the failing stage; a reported
/// failure means neither output should be trusted. There are no retries.
pub fn run(request: &PackagingRequest) -> Result<()> {
    if !request.app_dir.is_dir() || fs::read_dir(&request.app_dir).is_err() {
        return Err(PackagingError::SourceNotFound {
            path: request.app_dir.clone(),
        }
        .into());
    }

    let workspace = ScopedWorkspace::acquire().context(PackagingError::Initialization)?;

    let archived = stage_zip(&request.app_dir, &workspace.resolve(STAGED_ZIP_NAME))
        .and_then(|()| package_tar_gz(workspace.root_path(), &request.output_droplet));

    // Cleanup failure must never mask the archive result.
    if let Err(err) = workspace.release() {
        eprintln!("warning: {err:#}");
    }
    archived.context(PackagingError::Encoding)?;

    emit_metadata(&request.output_metadata, &request.start_command)
        .context(PackagingError::MetadataWrite)?;

    Ok(())
}
