use anyhow::{Context, Result};

use crate::packer::{build_bundle, PackConfig};

/// Pack the asset folder and report what was written
pub fn pack(config: &PackConfig) -> Result<()> {
    let manifest = build_bundle(config).context("Failed to build bundle")?;

    eprintln!(
        "Packed {} files ({} bytes) into {:?}, {} protected, manifest {:?} ({})",
        manifest.added_entries.len(),
        manifest.bundle_size(),
        config.bundle_path,
        manifest.path_to_protected_digest.len(),
        config.manifest_path,
        manifest.identifier,
    );

    Ok(())
}
