//! Staging metadata descriptor.
//!
//! The runtime platform consumes a small JSON sidecar describing how to
//! start the packaged application. The shape is a platform contract:
//! `execution_metadata` carries the serialized form of the nested
//! `{"start_command": ...}` object embedded as a string value, while
//! `detected_start_command` is a plain nested object. Both fields are
//! always present.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::io::write_file_atomic;

/// Top-level staging metadata document.
#[derive(Debug, Clone, Serialize)]
pub struct StartCommandDescriptor {
    /// Serialized `{"start_command": ...}` object, embedded as a string.
    pub execution_metadata: String,
    pub detected_start_command: DetectedStartCommand,
}

/// Start commands keyed by process type; the platform knows `web`.
#[derive(Debug, Clone, Serialize)]
pub struct DetectedStartCommand {
    pub web: String,
}

#[derive(Serialize)]
struct ExecutionMetadata<'a> {
    start_command: &'a str,
}

impl StartCommandDescriptor {
    /// Build the descriptor for `start_command`.
    pub fn new(start_command: &str) -> Result<Self> {
        let execution_metadata = serde_json::to_string(&ExecutionMetadata { start_command })
            .context("serializing execution metadata")?;
        Ok(Self {
            execution_metadata,
            detected_start_command: DetectedStartCommand {
                web: start_command.to_string(),
            },
        })
    }
}

/// Write the descriptor for `start_command` to `dest_path` as compact
/// JSON, overwriting any existing file.
///
/// Emission is independent of the droplet stages; it needs nothing but a
/// writable destination path.
pub fn emit_metadata(dest_path: &Path, start_command: &str) -> Result<()> {
    let descriptor = StartCommandDescriptor::new(start_command)?;
    let json = serde_json::to_string(&descriptor).context("serializing staging metadata")?;
    write_file_atomic(dest_path, json.as_bytes())
        .with_context(|| format!("writing staging metadata '{}'", dest_path.display()))
}
