//! Gzip-compressed tar packaging.
//!
//! Packages a directory tree into a single `.tar.gz`. In the droplet
//! pipeline the source is the staged workspace holding `app.zip`, but the
//! contract is general: any readable tree round-trips through the archive.
//!
//! The archive is built at a temporary sibling path and renamed into place
//! once the gzip stream is finished, so a failed run never leaves a
//! truncated droplet at the destination. Entry metadata is normalized
//! (mtime 0, uid/gid 0) to keep the output deterministic.

use anyhow::{bail, Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tar::{Builder as TarBuilder, EntryType, Header};

use super::{entry_mode, sorted_entries};
use crate::io::{atomic_rename, partial_sibling};

/// Package `source_dir`'s tree into a gzip-compressed tar archive at
/// `dest_archive`, creating the destination's parent directory if needed.
pub fn package_tar_gz(source_dir: &Path, dest_archive: &Path) -> Result<()> {
    if !source_dir.is_dir() {
        bail!(
            "source directory '{}' does not exist",
            source_dir.display()
        );
    }
    if let Some(parent) = dest_archive.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("creating output directory '{}'", parent.display())
            })?;
        }
    }

    let partial = partial_sibling(dest_archive);
    if let Err(err) = write_archive(source_dir, &partial) {
        let _ = fs::remove_file(&partial);
        return Err(err);
    }
    atomic_rename(&partial, dest_archive)
}

fn write_archive(source_dir: &Path, out_path: &Path) -> Result<()> {
    let out = File::create(out_path)
        .with_context(|| format!("creating archive file '{}'", out_path.display()))?;
    let encoder = GzEncoder::new(out, Compression::default());
    let mut builder = TarBuilder::new(encoder);

    for entry in sorted_entries(source_dir)? {
        let md = fs::symlink_metadata(&entry.path)
            .with_context(|| format!("reading metadata for '{}'", entry.path.display()))?;
        let mut header = Header::new_gnu();
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);
        header.set_mode(entry_mode(&md));

        if md.is_dir() {
            header.set_entry_type(EntryType::Directory);
            header.set_size(0);
            header.set_cksum();
            builder
                .append_data(&mut header, &entry.name, std::io::empty())
                .with_context(|| format!("adding directory entry '{}'", entry.name))?;
        } else if md.file_type().is_symlink() {
            let target = fs::read_link(&entry.path)
                .with_context(|| format!("reading symlink '{}'", entry.path.display()))?;
            header.set_entry_type(EntryType::Symlink);
            header.set_size(0);
            header
                .set_link_name(&target)
                .with_context(|| format!("recording symlink target for '{}'", entry.name))?;
            header.set_cksum();
            builder
                .append_data(&mut header, &entry.name, std::io::empty())
                .with_context(|| format!("adding symlink entry '{}'", entry.name))?;
        } else {
            let mut src = File::open(&entry.path)
                .with_context(|| format!("opening '{}'", entry.path.display()))?;
            header.set_entry_type(EntryType::Regular);
            header.set_size(md.len());
            header.set_cksum();
            builder
                .append_data(&mut header, &entry.name, &mut src)
                .with_context(|| format!("adding file entry '{}'", entry.name))?;
        }
    }

    let encoder = builder
        .into_inner()
        .context("finalizing tar stream")?;
    let mut out = encoder.finish().context("finishing gzip stream")?;
    out.flush()
        .with_context(|| format!("flushing archive file '{}'", out_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use tar::Archive;
    use tempfile::TempDir;

    fn fixture_tree(root: &Path) {
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("sub/file2.bin"), [1u8, 2, 3, 0, 255]).unwrap();
    }

    #[test]
    fn packaged_tree_round_trips() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("tree");
        fixture_tree(&source);
        let dest = temp.path().join("out.tar.gz");

        package_tar_gz(&source, &dest).unwrap();

        let extracted = temp.path().join("extracted");
        let mut archive = Archive::new(GzDecoder::new(File::open(&dest).unwrap()));
        archive.unpack(&extracted).unwrap();

        assert_eq!(fs::read(extracted.join("file1.txt")).unwrap(), b"hello");
        assert_eq!(
            fs::read(extracted.join("sub/file2.bin")).unwrap(),
            [1u8, 2, 3, 0, 255]
        );
        assert!(extracted.join("empty").is_dir());
    }

    #[test]
    fn destination_parent_is_created() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("tree");
        fixture_tree(&source);
        let dest = temp.path().join("nested/dir/out.tar.gz");

        package_tar_gz(&source, &dest).unwrap();
        assert!(dest.is_file());
    }

    #[test]
    fn identical_trees_package_to_identical_bytes() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("tree");
        fixture_tree(&source);
        let first = temp.path().join("first.tar.gz");
        let second = temp.path().join("second.tar.gz");

        package_tar_gz(&source, &first).unwrap();
        package_tar_gz(&source, &second).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn missing_source_fails_and_leaves_no_output() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out.tar.gz");
        assert!(package_tar_gz(&temp.path().join("absent"), &dest).is_err());
        assert!(!dest.exists());
        assert!(!partial_sibling(&dest).exists());
    }

    #[test]
    fn unwritable_destination_fails_and_leaves_no_output() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("tree");
        fixture_tree(&source);
        // The destination's parent is a regular file, so it cannot be created.
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let dest = blocker.join("out.tar.gz");

        assert!(package_tar_gz(&source, &dest).is_err());
        assert!(!dest.exists());
    }
}
