//! Small filesystem helpers shared by the output writers.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Temporary sibling path used while building `dest`.
pub(crate) fn partial_sibling(dest: &Path) -> PathBuf {
    match dest.file_name().and_then(|name| name.to_str()) {
        Some(name) => dest.with_file_name(format!(".{name}.partial")),
        None => dest.with_file_name(".output.partial"),
    }
}

/// Rename `src` to `dst`, falling back to copy+remove across filesystems.
pub(crate) fn atomic_rename(src: &Path, dst: &Path) -> Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(_) => {
            // Fall back to copy+remove (e.g. EXDEV).
            fs::copy(src, dst).with_context(|| {
                format!("copying '{}' to '{}'", src.display(), dst.display())
            })?;
            fs::remove_file(src)
                .with_context(|| format!("removing temporary file '{}'", src.display()))?;
            Ok(())
        }
    }
}

/// Write `bytes` to `dest` through a temporary sibling, replacing any
/// existing file only once the new content is fully on disk.
pub(crate) fn write_file_atomic(dest: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = partial_sibling(dest);
    if let Err(err) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(err).with_context(|| format!("writing '{}'", tmp.display()));
    }
    atomic_rename(&tmp, dest)
}
