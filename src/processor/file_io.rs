//! # File I/O Module
//!
//! This module provides file reading and writing utilities for the processor.
//! Writes are atomic: the new text goes to a temporary file in the same
//! directory, which then replaces the target.

use std::io::Write as _;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::UpdateError;

/// File I/O operations for the processor.
pub struct FileIO;

impl FileIO {
  /// Read the full file as UTF-8 text.
  ///
  /// # Errors
  ///
  /// Returns [`UpdateError::Io`] when the file is missing, unreadable, or not
  /// valid UTF-8.
  pub fn read(path: &Path) -> Result<String, UpdateError> {
    std::fs::read_to_string(path).map_err(|e| UpdateError::io(path, e))
  }

  /// Atomically replace the file's content.
  ///
  /// The original file's permissions are carried over to the new file.
  ///
  /// # Parameters
  ///
  /// * `path` - Path to the file to write
  /// * `content` - Complete new content
  pub fn write_atomic(path: &Path, content: &str) -> Result<(), UpdateError> {
    let dir = match path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };

    let permissions = std::fs::metadata(path).map_err(|e| UpdateError::io(path, e))?.permissions();

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| UpdateError::io(path, e))?;
    temp
      .write_all(content.as_bytes())
      .and_then(|()| temp.as_file().sync_all())
      .map_err(|e| UpdateError::io(path, e))?;
    std::fs::set_permissions(temp.path(), permissions).map_err(|e| UpdateError::io(path, e))?;

    temp.persist(path).map_err(|e| UpdateError::io(path, e.error))?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_read_missing_file_is_io_error() {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let err = FileIO::read(&temp_dir.path().join("gone.c")).expect_err("missing file");
    assert!(matches!(err, UpdateError::Io { .. }));
  }

  #[test]
  fn test_read_non_utf8_is_io_error() {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let path = temp_dir.path().join("bin.c");
    std::fs::write(&path, [0xff, 0xfe, 0x00]).expect("write");
    assert!(matches!(FileIO::read(&path), Err(UpdateError::Io { .. })));
  }

  #[test]
  fn test_write_atomic_replaces_content() {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let path = temp_dir.path().join("a.c");
    std::fs::write(&path, "old").expect("write");

    FileIO::write_atomic(&path, "new content\n").expect("atomic write");
    assert_eq!(std::fs::read_to_string(&path).expect("read"), "new content\n");

    let leftovers = std::fs::read_dir(temp_dir.path()).expect("read dir").count();
    assert_eq!(leftovers, 1);
  }

  #[cfg(unix)]
  #[test]
  fn test_write_atomic_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let path = temp_dir.path().join("run.sh");
    std::fs::write(&path, "#!/bin/sh\n").expect("write");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");

    FileIO::write_atomic(&path, "#!/bin/sh\necho hi\n").expect("atomic write");
    let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
  }
}
