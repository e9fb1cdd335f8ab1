use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::path::check_manifest_path;

/// One packed file and where its bytes live in the bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub path: String,
    pub byte_offset: u64,
    pub length: u64,
    #[serde(rename = "sha256HashBase64Encoded")]
    pub digest: String,
}

/// Version marker reserved for incremental updates. Never populated yet, so always
/// serialised as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionNumber(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub application_version_number: Option<VersionNumber>,
    pub version_number: Option<VersionNumber>,
    pub previous_version_number: Option<VersionNumber>,
    #[serde(rename = "uuid")]
    pub identifier: String,
    /// Paths dropped since the previous bundle, always empty until diffing exists
    #[serde(rename = "removed")]
    pub removed_paths: Vec<String>,
    /// Packed files in bundle order
    #[serde(rename = "added")]
    pub added_entries: Vec<FileEntry>,
    #[serde(rename = "pathToHash")]
    pub path_to_digest: BTreeMap<String, String>,
    #[serde(rename = "pathToDetails")]
    pub path_to_protected_digest: BTreeMap<String, String>,
}

impl Manifest {
    /// Manifest for a fresh bundle with no previous version to diff against
    pub fn new(
        identifier: String,
        added_entries: Vec<FileEntry>,
        path_to_digest: BTreeMap<String, String>,
        path_to_protected_digest: BTreeMap<String, String>,
    ) -> Self {
        Self {
            application_version_number: None,
            version_number: None,
            previous_version_number: None,
            identifier,
            removed_paths: vec![],
            added_entries,
            path_to_digest,
            path_to_protected_digest,
        }
    }

    /// Total number of bundle bytes described by the manifest
    pub fn bundle_size(&self) -> u64 {
        self.added_entries.iter().map(|e| e.length).sum()
    }

    /// Fail on the first packed or detail path that could escape a folder it's joined onto
    pub fn check_paths(&self) -> Result<()> {
        self.added_entries
            .iter()
            .map(|e| e.path.as_str())
            .chain(self.path_to_protected_digest.keys().map(String::as_str))
            .try_for_each(check_manifest_path)
    }

    pub fn entry(&self, path: &str) -> Option<&FileEntry> {
        self.added_entries.iter().find(|e| e.path == path)
    }

    /// Pretty JSON with two-space indentation. Map keys come out sorted.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialise manifest")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse manifest")
    }

    /// Write the manifest, creating parent folders as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create folder: {:?}", parent))?;
        }
        fs::write(path, json).with_context(|| format!("Failed to write manifest: {:?}", path))
    }
}

/// Load a manifest file from disk
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    Manifest::from_json(&json)
}
