//! Archive builders for the droplet pipeline.
//!
//! - [`zip`] - Zip staging of the application directory
//! - [`targz`] - Gzip-compressed tar packaging of the staged workspace
//!
//! Both builders walk their source tree the same way: entries are collected
//! relative to the source root and sorted by relative path, so identical
//! input trees always encode to byte-identical archives.

pub mod targz;
pub mod zip;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A filesystem entry scheduled for archiving.
pub(crate) struct ArchiveEntry {
    /// Absolute path on disk.
    pub(crate) path: PathBuf,
    /// Slash-separated path relative to the source root.
    pub(crate) name: String,
}

/// Collect `root`'s tree as relative entries in sorted order, the root
/// itself excluded. Symlinks are reported, not followed.
pub(crate) fn sorted_entries(root: &Path) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry
            .with_context(|| format!("walking source directory '{}'", root.display()))?;
        if entry.path() == root {
            continue;
        }
        let rel = entry.path().strip_prefix(root).with_context(|| {
            format!(
                "resolving '{}' relative to '{}'",
                entry.path().display(),
                root.display()
            )
        })?;
        entries.push(ArchiveEntry {
            path: entry.path().to_path_buf(),
            name: rel.to_string_lossy().replace('\\', "/"),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Permission bits recorded for an entry.
#[cfg(unix)]
pub(crate) fn entry_mode(md: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    md.permissions().mode()
}

#[cfg(not(unix))]
pub(crate) fn entry_mode(md: &fs::Metadata) -> u32 {
    if md.is_dir() {
        0o755
    } else if md.file_type().is_symlink() {
        0o777
    } else {
        0o644
    }
}
