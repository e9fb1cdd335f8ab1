//! Deterministic walk over the asset folder

use std::{fs, path::Path};

use anyhow::{Context, Result};
use walkdir::{DirEntry, WalkDir};

use crate::path::manifest_path;

/// A file found under the asset root, read fully into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    /// Forward-slash path relative to the asset root
    pub path: String,
    pub contents: Vec<u8>,
}

/// Lazily walk every file under `root`, sorted by name within each folder so the order is the
/// same on every run. Folders are skipped, symlinks are packed only when they point at a file
/// and a dangling symlink is an error.
///
/// Files are read one at a time as the iterator advances. The first error is fatal to the
/// caller, the walk doesn't try to skip past it.
pub fn walk_assets(root: &Path) -> impl Iterator<Item = Result<AssetFile>> + '_ {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .map(move |entry| {
            let entry =
                entry.with_context(|| format!("Failed to walk asset folder: {:?}", root))?;
            load_entry(root, &entry)
        })
        .filter_map(Result::transpose)
}

fn load_entry(root: &Path, entry: &DirEntry) -> Result<Option<AssetFile>> {
    let file_type = entry.file_type();
    let is_file = if file_type.is_symlink() {
        // A link that can't be resolved is an unreadable asset, not something to skip
        fs::metadata(entry.path())
            .with_context(|| format!("Failed to resolve asset symlink: {:?}", entry.path()))?
            .is_file()
    } else {
        file_type.is_file()
    };
    if !is_file {
        return Ok(None);
    }

    let path = manifest_path(root, entry.path())?;
    let contents = fs::read(entry.path())
        .with_context(|| format!("Failed to read asset file: {:?}", entry.path()))?;

    Ok(Some(AssetFile { path, contents }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, path: &str, contents: &[u8]) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_walk_order_and_paths() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.txt", b"b");
        write(dir.path(), "a/z.txt", b"az");
        write(dir.path(), "a/c/d.txt", b"acd");
        write(dir.path(), "A.txt", b"upper");
        fs::create_dir_all(dir.path().join("empty")).unwrap();

        let files = walk_assets(dir.path())
            .collect::<Result<Vec<_>>>()
            .unwrap();
        let paths = files.iter().map(|f| f.path.as_str()).collect::<Vec<_>>();

        assert_eq!(paths, ["A.txt", "a/c/d.txt", "a/z.txt", "b.txt"]);
        assert_eq!(files[1].contents, b"acd");
    }

    #[test]
    fn test_walk_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["x", "y/1", "y/2", "z/a/b"] {
            write(dir.path(), name, name.as_bytes());
        }

        let first = walk_assets(dir.path()).collect::<Result<Vec<_>>>().unwrap();
        let second = walk_assets(dir.path()).collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(walk_assets(dir.path()).count(), 0);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let mut walk = walk_assets(&missing);
        assert!(walk.next().unwrap().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_packed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "real.txt", b"real");
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
            .unwrap();

        let files = walk_assets(dir.path()).collect::<Result<Vec<_>>>().unwrap();
        let paths = files.iter().map(|f| f.path.as_str()).collect::<Vec<_>>();
        assert_eq!(paths, ["link.txt", "real.txt"]);
        assert_eq!(files[0].contents, b"real");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_folder_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        write(outside.path(), "hidden.txt", b"hidden");
        write(dir.path(), "a.txt", b"a");
        std::os::unix::fs::symlink(outside.path(), dir.path().join("linked")).unwrap();

        let files = walk_assets(dir.path()).collect::<Result<Vec<_>>>().unwrap();
        let paths = files.iter().map(|f| f.path.as_str()).collect::<Vec<_>>();
        assert_eq!(paths, ["a.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", b"a");
        std::os::unix::fs::symlink(dir.path().join("gone.bin"), dir.path().join("b.bin"))
            .unwrap();

        let results = walk_assets(dir.path()).collect::<Vec<_>>();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
