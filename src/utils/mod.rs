//! Filesystem helpers

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Write `bytes` to `path` through a temporary sibling and a rename
///
/// Parent directories are created when absent. A reader never observes a
/// half-written file at `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    write_atomic_all(&[(path, bytes)])
}

/// Write several files, staging every temporary sibling before renaming any
///
/// When a file cannot be staged, nothing is renamed into place and the staged
/// temporaries are removed.
pub fn write_atomic_all(files: &[(&Path, &[u8])]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());
    for &(path, bytes) in files {
        match stage(path, bytes) {
            Ok(tmp) => staged.push((tmp, path)),
            Err(e) => {
                discard(&staged);
                return Err(e);
            }
        }
    }

    for (i, (tmp, path)) in staged.iter().enumerate() {
        if let Err(e) = std::fs::rename(tmp, path) {
            discard(&staged[i..]);
            return Err(e.into());
        }
    }
    Ok(())
}

fn stage(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    if let Err(e) = std::fs::write(&tmp, bytes) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(tmp)
}

fn discard(staged: &[(PathBuf, &Path)]) {
    for (tmp, _) in staged {
        let _ = std::fs::remove_file(tmp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("out.json");
        write_atomic(&path, b"{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
        assert!(!dir.path().join("a").join("b").join("out.json.tmp").exists());
    }

    #[test]
    fn test_write_atomic_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
    }

    #[test]
    fn test_write_atomic_all_renames_nothing_when_staging_fails() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("app").join("model.json");
        // A regular file where the second artifact's directory should be
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let schema = blocker.join("features.json");

        let result = write_atomic_all(&[
            (model.as_path(), &b"{}"[..]),
            (schema.as_path(), &b"{}"[..]),
        ]);
        assert!(result.is_err());
        assert!(!model.exists());
        assert!(!dir.path().join("app").join("model.json.tmp").exists());
    }

    #[test]
    fn test_write_atomic_all_writes_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("nested").join("b.json");
        write_atomic_all(&[(a.as_path(), &b"1"[..]), (b.as_path(), &b"2"[..])]).unwrap();
        assert_eq!(std::fs::read_to_string(&a).unwrap(), "1");
        assert_eq!(std::fs::read_to_string(&b).unwrap(), "2");
    }
}
