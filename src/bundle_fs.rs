use std::{collections::HashMap, path::Path};

use anyhow::{ensure, Context, Result};
use bytes::Bytes;

use crate::{
    bundle::{load_bundle_content, Bundle},
    hasher::plain_digest,
    manifest::{load_manifest, FileEntry, Manifest},
};

/// Read-only view over a packed bundle, addressed by the paths in its manifest
pub struct FS {
    manifest: Manifest,
    bundle: Bundle,
    lut: HashMap<String, usize>,
}

impl FS {
    /// Load a manifest and the bundle it describes. Manifests with paths that could escape an
    /// output folder are rejected.
    pub fn open(manifest_path: &Path, bundle_path: &Path) -> Result<FS> {
        let manifest = load_manifest(manifest_path).context("Failed to load manifest")?;
        manifest
            .check_paths()
            .with_context(|| format!("Refusing to open manifest: {:?}", manifest_path))?;
        let bundle = load_bundle_content(bundle_path).context("Failed to load bundle")?;
        Ok(Self::new(manifest, bundle))
    }

    pub fn new(manifest: Manifest, bundle: Bundle) -> FS {
        let lut = manifest
            .added_entries
            .iter()
            .enumerate()
            .map(|(i, f)| (f.path.clone(), i))
            .collect();

        FS {
            manifest,
            bundle,
            lut,
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    /// Lists all paths in the manifest, in bundle order
    pub fn list(&self) -> impl Iterator<Item = &str> + '_ {
        self.manifest.added_entries.iter().map(|e| e.path.as_str())
    }

    pub fn entry(&self, path: &str) -> Option<&FileEntry> {
        self.lut.get(path).map(|&i| &self.manifest.added_entries[i])
    }

    /// Read many files at once, reporting failures per path
    pub fn batch_read<'a>(
        &'a self,
        paths: &'a [&str],
    ) -> impl Iterator<Item = Result<(&'a str, Bytes), (&'a str, anyhow::Error)>> + 'a {
        paths
            .iter()
            .map(|&path| self.read(path).map(|b| (path, b)).map_err(|e| (path, e)))
    }

    pub fn read(&self, path: &str) -> Result<Bytes> {
        let file = self
            .entry(path)
            .with_context(|| format!("Path not found in manifest: {}", path))?;

        self.bundle
            .read_range(file.byte_offset, file.length)
            .with_context(|| format!("Failed to read {} from bundle", path))
    }

    /// Read a file and check its bytes still hash to the manifest digest
    pub fn read_verified(&self, path: &str) -> Result<Bytes> {
        let contents = self.read(path)?;
        let expected = self.entry(path).map(|e| e.digest.as_str()).unwrap_or_default();
        ensure!(
            plain_digest(&contents) == expected,
            "Contents of {} don't match the manifest digest",
            path
        );
        Ok(contents)
    }
}
