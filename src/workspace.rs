//! Scoped temporary workspace for one packaging run.
//!
//! The pipeline stages the intermediate `app.zip` inside a scratch
//! directory that must disappear on every exit path, success or failure.
//! The guard returned by [`ScopedWorkspace::acquire`] deletes its directory
//! when dropped; [`ScopedWorkspace::release`] does the same explicitly and
//! reports deletion errors to the caller.

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static WORKSPACE_SEQ: AtomicU64 = AtomicU64::new(0);

/// A uniquely named scratch directory, recursively deleted when released
/// or dropped.
#[derive(Debug)]
pub struct ScopedWorkspace {
    root: PathBuf,
    released: bool,
}

impl ScopedWorkspace {
    /// Create a fresh, empty workspace under the system temp directory.
    pub fn acquire() -> Result<Self> {
        Self::acquire_in(&std::env::temp_dir())
    }

    /// Create a fresh, empty workspace under `base`.
    ///
    /// Uniqueness comes from the process id, a nanosecond timestamp, and a
    /// process-wide sequence number; a collision with another process is
    /// retried under a new name.
    pub fn acquire_in(base: &Path) -> Result<Self> {
        for _ in 0..16 {
            let root = base.join(unique_name());
            match fs::create_dir(&root) {
                Ok(()) => {
                    return Ok(Self {
                        root,
                        released: false,
                    })
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(err) => {
                    return Err(err).with_context(|| {
                        format!("creating scratch workspace '{}'", root.display())
                    })
                }
            }
        }
        bail!(
            "failed to find an unused scratch workspace name under '{}'",
            base.display()
        )
    }

    /// The workspace directory itself, for passing to downstream steps.
    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// Build a child path inside the workspace.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    /// Recursively delete the workspace.
    ///
    /// Consumes the guard; after a successful release the `Drop` backstop
    /// has nothing left to do.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        fs::remove_dir_all(&self.root)
            .with_context(|| format!("removing scratch workspace '{}'", self.root.display()))
    }
}

impl Drop for ScopedWorkspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = fs::remove_dir_all(&self.root) {
            if self.root.exists() {
                eprintln!(
                    "warning: failed to remove scratch workspace '{}': {err}",
                    self.root.display()
                );
            }
        }
    }
}

fn unique_name() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let seq = WORKSPACE_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("droplet-staging-{}-{nanos}-{seq}", process::id())
}
