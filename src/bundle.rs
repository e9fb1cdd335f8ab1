use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{ensure, Context, Result};
use bytes::Bytes;

/// Append-only writer for the bundle blob. Files are concatenated with no framing, so the
/// current offset is always the total number of bytes appended so far.
pub struct BundleWriter<W: Write = BufWriter<File>> {
    inner: W,
    offset: u64,
}

impl BundleWriter {
    /// Create the bundle file, truncating anything already there
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create bundle file: {:?}", path))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> BundleWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, offset: 0 }
    }

    /// Byte offset the next appended file will start at
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Write the whole buffer at the current offset, returning the number of bytes written
    pub fn append(&mut self, data: &[u8]) -> Result<u64> {
        self.inner
            .write_all(data)
            .with_context(|| format!("Failed to write to bundle at offset {}", self.offset))?;

        let written = data.len() as u64;
        self.offset += written;
        Ok(written)
    }

    /// Flush and close the bundle, returning its total size. Dropping the writer without
    /// calling this still releases the handle, but leaves the blob incomplete.
    pub fn finish(mut self) -> Result<u64> {
        self.inner.flush().context("Failed to flush bundle")?;
        Ok(self.offset)
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// A bundle blob loaded into memory
#[derive(Debug, Clone)]
pub struct Bundle {
    content: Bytes,
}

impl Bundle {
    pub fn new(content: Bytes) -> Self {
        Self { content }
    }

    pub fn len(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Return the entire content of the bundle
    pub fn read_all(&self) -> Bytes {
        self.content.clone()
    }

    /// Slice out a range of the bundle without copying
    pub fn read_range(&self, offset: u64, len: u64) -> Result<Bytes> {
        let end = offset
            .checked_add(len)
            .with_context(|| format!("Range overflows: offset {} length {}", offset, len))?;
        ensure!(
            end <= self.len(),
            "Range {}..{} is outside of the bundle ({} bytes)",
            offset,
            end,
            self.len()
        );

        Ok(self.content.slice(offset as usize..end as usize))
    }
}

/// Load a bundle file from disk
pub fn load_bundle_content(path: &Path) -> Result<Bundle> {
    let content =
        fs::read(path).with_context(|| format!("Failed to read bundle file: {:?}", path))?;
    Ok(Bundle::new(Bytes::from(content)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_tracks_offset() {
        let mut writer = BundleWriter::new(Vec::new());
        assert_eq!(writer.offset(), 0);

        assert_eq!(writer.append(b"hi").unwrap(), 2);
        assert_eq!(writer.offset(), 2);
        assert_eq!(writer.append(b"").unwrap(), 0);
        assert_eq!(writer.append(b"bye").unwrap(), 3);
        assert_eq!(writer.offset(), 5);

        assert_eq!(writer.into_inner(), b"hibye");
    }

    #[test]
    fn test_create_truncates_and_finish_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.cb");
        fs::write(&path, b"stale contents from a previous run").unwrap();

        let mut writer = BundleWriter::create(&path).unwrap();
        writer.append(b"abc").unwrap();
        assert_eq!(writer.finish().unwrap(), 3);

        assert_eq!(fs::read(&path).unwrap(), b"abc");
    }

    #[test]
    fn test_create_fails_for_missing_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.cb");
        assert!(BundleWriter::create(&path).is_err());
    }

    #[test]
    fn test_read_range() {
        let bundle = Bundle::new(Bytes::from_static(b"hibye"));
        assert_eq!(bundle.read_range(0, 2).unwrap(), &b"hi"[..]);
        assert_eq!(bundle.read_range(2, 3).unwrap(), &b"bye"[..]);
        assert_eq!(bundle.read_range(5, 0).unwrap(), &b""[..]);
        assert!(bundle.read_range(3, 3).is_err());
        assert!(bundle.read_range(u64::MAX, 2).is_err());
    }
}
