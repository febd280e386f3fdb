//! Packages a built application directory into a deployable droplet.
//!
//! This crate is the staging step of a platform-as-a-service pipeline.
//! Given a directory of already-built application artifacts it produces
//! two deliverables:
//!
//! - **Droplet** - a gzip-compressed tar archive whose sole top-level
//!   entry is `app.zip`, a zip archive mirroring the application tree.
//!   The zip-inside-a-tar.gz nesting is a fixed protocol requirement of
//!   the consuming platform, never flattened.
//! - **Staging metadata** - a JSON descriptor recording the start command
//!   the platform uses to launch the application.
//!
//! # Architecture
//!
//! ```text
//! PackagingRequest
//!     │
//!     ├── workspace        unique scratch dir, deleted on every exit path
//!     ├── archive::zip     app dir   -> <workspace>/app.zip
//!     ├── archive::targz   workspace -> droplet (.tar.gz)
//!     └── metadata         start command -> JSON descriptor
//! ```
//!
//! Stages run strictly in sequence within one invocation; concurrent
//! invocations are safe because every run owns a uniquely named
//! workspace. Both outputs are written atomically, so a failed run never
//! leaves a truncated droplet or descriptor behind.
//!
//! # Example
//!
//! ```rust,ignore
//! use droplet_builder::{run, PackagingRequest};
//!
//! run(&PackagingRequest {
//!     app_dir: "/srv/build/app".into(),
//!     output_droplet: "/srv/out/droplet.tgz".into(),
//!     output_metadata: "/srv/out/result.json".into(),
//!     start_command: "./bin/run.sh".into(),
//! })?;
//! ```

pub mod archive;
pub mod error;
mod io;
pub mod metadata;
pub mod pipeline;
pub mod workspace;

pub use error::PackagingError;
pub use metadata::{emit_metadata, DetectedStartCommand, StartCommandDescriptor};
pub use pipeline::{run, PackagingRequest, STAGED_ZIP_NAME};
pub use workspace::ScopedWorkspace;
