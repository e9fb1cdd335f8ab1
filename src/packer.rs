//! Build a bundle and its manifest from an asset folder

use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};

use crate::{
    asset_fs::{walk_assets, AssetFile},
    bundle::BundleWriter,
    hasher::{keyed_digest, plain_digest, SecretKey},
    identifier::new_identifier,
    manifest::{FileEntry, Manifest},
    verbose,
};

/// Files whose digests are additionally keyed with the secret, relative to the asset root
pub const DETAIL_PATHS: [&str; 3] = ["songs/unlocks", "songs/packlist", "songs/songlist"];

#[derive(Debug, Clone)]
pub struct PackConfig {
    pub asset_root: PathBuf,
    pub bundle_path: PathBuf,
    pub manifest_path: PathBuf,
    pub key: SecretKey,
}

/// Everything learned while appending files to the bundle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedAssets {
    pub entries: Vec<FileEntry>,
    pub path_to_digest: BTreeMap<String, String>,
}

impl PackedAssets {
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.length).sum()
    }
}

/// Append each file to the bundle in order, recording where it landed
pub fn pack_assets<W: Write>(
    files: impl Iterator<Item = Result<AssetFile>>,
    writer: &mut BundleWriter<W>,
) -> Result<PackedAssets> {
    let mut packed = PackedAssets::default();

    for file in files {
        let AssetFile { path, contents } = file?;

        let digest = plain_digest(&contents);
        let byte_offset = writer.offset();
        let length = writer
            .append(&contents)
            .with_context(|| format!("Failed to pack file: {}", path))?;
        ensure!(
            length == contents.len() as u64,
            "Short write for {}: {} of {} bytes",
            path,
            length,
            contents.len()
        );

        if verbose() {
            eprintln!("Packed file: {} ({} bytes at {})", path, length, byte_offset);
        }

        packed.path_to_digest.insert(path.clone(), digest.clone());
        packed.entries.push(FileEntry {
            path,
            byte_offset,
            length,
            digest,
        });
    }

    Ok(packed)
}

/// Keyed digests for the detail files that exist under the asset root. Missing or unreadable
/// files are left out.
pub fn protected_digests(
    asset_root: &Path,
    detail_paths: &[&str],
    key: &SecretKey,
) -> BTreeMap<String, String> {
    detail_paths
        .iter()
        .filter_map(|&path| match fs::read(asset_root.join(path)) {
            Ok(contents) => Some((path.to_string(), keyed_digest(&contents, key))),
            Err(e) => {
                if verbose() {
                    eprintln!("Skipping detail file: {}: {}", path, e);
                }
                None
            }
        })
        .collect()
}

/// Run the whole build: pack the bundle, then write the manifest describing it
pub fn build_bundle(config: &PackConfig) -> Result<Manifest> {
    ensure!(
        config.asset_root.is_dir(),
        "Asset folder doesn't exist: {:?}",
        config.asset_root
    );

    let identifier = new_identifier().context("Failed to generate bundle identifier")?;

    let packed = {
        let mut writer = BundleWriter::create(&config.bundle_path)?;
        let packed = pack_assets(walk_assets(&config.asset_root), &mut writer)?;
        writer.finish()?;
        packed
    };

    let path_to_protected_digest =
        protected_digests(&config.asset_root, &DETAIL_PATHS, &config.key);

    let manifest = Manifest::new(
        identifier,
        packed.entries,
        packed.path_to_digest,
        path_to_protected_digest,
    );
    manifest.save(&config.manifest_path)?;

    Ok(manifest)
}
