//! Zip staging of the application directory.
//!
//! Staging copies the whole application tree into a single zip archive
//! whose entry paths mirror the relative paths under the source root. No
//! filtering, no transformation. Timestamps are pinned so the same tree
//! always stages to the same bytes.

use anyhow::{bail, Context, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{entry_mode, sorted_entries};

/// Stage `source_dir`'s tree into a zip archive at `dest_zip`.
///
/// Covers regular files (bytes preserved exactly), directories (explicit
/// entries, so empty directories survive extraction), and symlinks.
/// `dest_zip`'s parent directory must already exist; `source_dir` is not
/// mutated.
pub fn stage_zip(source_dir: &Path, dest_zip: &Path) -> Result<()> {
    if !source_dir.is_dir() {
        bail!(
            "application directory '{}' does not exist",
            source_dir.display()
        );
    }

    let file = File::create(dest_zip)
        .with_context(|| format!("creating staged archive '{}'", dest_zip.display()))?;
    let mut writer = ZipWriter::new(BufWriter::new(file));

    for entry in sorted_entries(source_dir)? {
        let md = fs::symlink_metadata(&entry.path)
            .with_context(|| format!("reading metadata for '{}'", entry.path.display()))?;
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(entry_mode(&md));

        if md.is_dir() {
            writer
                .add_directory(entry.name.as_str(), options)
                .with_context(|| format!("adding directory entry '{}'", entry.name))?;
        } else if md.file_type().is_symlink() {
            let target = fs::read_link(&entry.path)
                .with_context(|| format!("reading symlink '{}'", entry.path.display()))?;
            writer
                .add_symlink(entry.name.as_str(), target.to_string_lossy(), options)
                .with_context(|| format!("adding symlink entry '{}'", entry.name))?;
        } else {
            writer
                .start_file(entry.name.as_str(), options)
                .with_context(|| format!("adding file entry '{}'", entry.name))?;
            let mut src = File::open(&entry.path)
                .with_context(|| format!("opening '{}'", entry.path.display()))?;
            io::copy(&mut src, &mut writer)
                .with_context(|| format!("writing file entry '{}'", entry.name))?;
        }
    }

    let mut out = writer
        .finish()
        .with_context(|| format!("finalizing staged archive '{}'", dest_zip.display()))?;
    out.flush()
        .with_context(|| format!("flushing staged archive '{}'", dest_zip.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn fixture_tree(root: &Path) {
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("sub/file2.bin"), [0u8, 159, 146, 150]).unwrap();
    }

    fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Vec<u8> {
        let mut entry = archive.by_name(name).unwrap();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn staged_zip_round_trips_the_tree() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("app");
        fixture_tree(&source);
        let dest = temp.path().join("app.zip");

        stage_zip(&source, &dest).unwrap();

        let mut archive = ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert!(names.contains(&"file1.txt".to_string()));
        assert!(names.contains(&"sub/file2.bin".to_string()));
        assert!(names.contains(&"empty/".to_string()));

        assert_eq!(read_entry(&mut archive, "file1.txt"), b"hello");
        assert_eq!(read_entry(&mut archive, "sub/file2.bin"), [0u8, 159, 146, 150]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_recorded_as_entries() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("app");
        fixture_tree(&source);
        std::os::unix::fs::symlink("file1.txt", source.join("link")).unwrap();
        let dest = temp.path().join("app.zip");

        stage_zip(&source, &dest).unwrap();

        let archive = ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&"link"));
    }

    #[test]
    fn identical_trees_stage_to_identical_bytes() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("app");
        fixture_tree(&source);
        let first = temp.path().join("first.zip");
        let second = temp.path().join("second.zip");

        stage_zip(&source, &first).unwrap();
        stage_zip(&source, &second).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn missing_source_directory_fails() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("app.zip");
        assert!(stage_zip(&temp.path().join("absent"), &dest).is_err());
    }

    #[test]
    fn empty_source_directory_stages_an_empty_archive() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("app");
        fs::create_dir(&source).unwrap();
        let dest = temp.path().join("app.zip");

        stage_zip(&source, &dest).unwrap();

        let archive = ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
