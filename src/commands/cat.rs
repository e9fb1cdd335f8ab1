use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};

use crate::bundle_fs::FS;

/// Write a packed file to `out`, refusing files whose bytes no longer match the manifest
pub fn cat_file_to(fs: &FS, path: &str, out: impl Write) -> Result<()> {
    let contents = fs.read_verified(path)?;

    let mut out = BufWriter::new(out);
    out.write_all(&contents)
        .with_context(|| format!("Failed to write {}", path))?;
    out.flush().context("Failed to flush output")
}

/// Write the contents of the file to stdout
pub fn cat_file(fs: &FS, path: &str) -> Result<()> {
    cat_file_to(fs, path, io::stdout().lock()).context("Failed to cat file")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use bytes::Bytes;

    use super::*;
    use crate::{
        bundle::Bundle,
        hasher::plain_digest,
        manifest::{FileEntry, Manifest},
    };

    fn bundle_fs(digest: String) -> FS {
        let entries = vec![FileEntry {
            path: "songs/unlocks".to_string(),
            byte_offset: 0,
            length: 5,
            digest,
        }];
        let manifest = Manifest::new("id".to_string(), entries, BTreeMap::new(), BTreeMap::new());
        FS::new(manifest, Bundle::new(Bytes::from_static(b"hibye")))
    }

    #[test]
    fn test_cat_writes_contents() {
        let mut out = vec![];
        cat_file_to(&bundle_fs(plain_digest(b"hibye")), "songs/unlocks", &mut out).unwrap();
        assert_eq!(out, b"hibye");
    }

    #[test]
    fn test_cat_refuses_mismatched_digest() {
        let mut out = vec![];
        let fs = bundle_fs(plain_digest(b"something else"));
        assert!(cat_file_to(&fs, "songs/unlocks", &mut out).is_err());
        assert!(out.is_empty());
        assert!(cat_file_to(&fs, "missing", &mut out).is_err());
    }
}
