//! Atomic output writes for render-shim.
//!
//! Rendered documents are written to a temporary file in the destination
//! directory, synced, and then renamed over the target, so readers never see
//! a half-written PDF or image.
//!
//! Source and destination must be on the same filesystem for the rename to be
//! atomic; creating the temporary next to the target guarantees that. On a
//! crash a `.render-shim*` temporary may remain in the destination directory.

use crate::error::{Result, ShimError};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// What to do when the target already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    /// Replace an existing file.
    Replace,
    /// Fail with `OutputExists` if the target exists.
    Refuse,
}

/// Atomically write bytes to a file.
///
/// Parent directories are created as needed. With [`Overwrite::Refuse`] the
/// final rename fails instead of replacing a file that appeared in the
/// meantime.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8], overwrite: Overwrite) -> Result<()> {
    let path = path.as_ref();

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent).map_err(|e| {
            ShimError::io(
                format!("failed to create parent directory '{}'", parent.display()),
                e,
            )
        })?;
    }

    let mut temp = tempfile::Builder::new()
        .prefix(".render-shim")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| {
            ShimError::io(
                format!("failed to create temporary file in '{}'", parent.display()),
                e,
            )
        })?;

    write_and_sync(&mut temp, content)?;

    match overwrite {
        Overwrite::Replace => temp.persist(path).map(drop).map_err(|e| {
            ShimError::io(
                format!("failed to atomically replace '{}'", path.display()),
                e.error,
            )
        }),
        Overwrite::Refuse => temp.persist_noclobber(path).map(drop).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                ShimError::OutputExists {
                    path: path.to_path_buf(),
                }
            } else {
                ShimError::io(format!("failed to create '{}'", path.display()), e.error)
            }
        }),
    }
}

fn write_and_sync(temp: &mut NamedTempFile, content: &[u8]) -> Result<()> {
    temp.write_all(content)
        .map_err(|e| ShimError::io("failed to write to temporary file", e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| ShimError::io("failed to sync temporary file to disk", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("out.pdf");

        atomic_write(&file_path, b"%PDF-1.4", Overwrite::Refuse).unwrap();

        assert_eq!(fs::read(&file_path).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn test_atomic_write_replace_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("out.pdf");
        fs::write(&file_path, "original content").unwrap();

        atomic_write(&file_path, b"new content", Overwrite::Replace).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_atomic_write_refuses_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("out.pdf");
        fs::write(&file_path, "original content").unwrap();

        let err = atomic_write(&file_path, b"new content", Overwrite::Refuse).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::OutputExists);
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "original content");
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a/b/c/out.jpg");

        atomic_write(&file_path, b"\xff\xd8\xff", Overwrite::Refuse).unwrap();

        assert_eq!(fs::read(&file_path).unwrap(), b"\xff\xd8\xff");
    }

    #[test]
    fn test_atomic_write_leaves_no_temporaries() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("out.pdf");

        atomic_write(&file_path, b"one", Overwrite::Replace).unwrap();
        atomic_write(&file_path, b"two", Overwrite::Replace).unwrap();
        let _ = atomic_write(&file_path, b"three", Overwrite::Refuse);

        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("out.pdf")]);
    }

    #[test]
    fn test_atomic_write_empty_content() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("empty.pdf");

        atomic_write(&file_path, b"", Overwrite::Refuse).unwrap();

        assert!(fs::read(&file_path).unwrap().is_empty());
    }
}
