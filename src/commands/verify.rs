use std::collections::BTreeMap;

use anyhow::{bail, Result};

use crate::{
    bundle_fs::FS,
    hasher::{keyed_digest, plain_digest, SecretKey},
    packer::DETAIL_PATHS,
    path::check_manifest_path,
};

/// Problems found while checking a bundle against its manifest
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub checked: usize,
    pub problems: Vec<String>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Check paths, offsets, sizes and digests of every packed file. Keyed digests are only
/// recomputed when a key is given, but keyed entries outside the detail files are always flagged.
pub fn check_bundle(fs: &FS, key: Option<&SecretKey>) -> VerifyReport {
    let manifest = fs.manifest();
    let mut report = VerifyReport::default();

    let mut expected_offset = 0;
    for entry in &manifest.added_entries {
        report.checked += 1;

        if let Err(e) = check_manifest_path(&entry.path) {
            report.problems.push(format!("{}: {:#}", entry.path, e));
        }

        if entry.byte_offset != expected_offset {
            report.problems.push(format!(
                "{}: starts at {} but the previous file ends at {}",
                entry.path, entry.byte_offset, expected_offset
            ));
        }
        expected_offset = entry.byte_offset.saturating_add(entry.length);

        match fs.read(&entry.path) {
            Ok(contents) if plain_digest(&contents) != entry.digest => report
                .problems
                .push(format!("{}: digest doesn't match contents", entry.path)),
            Ok(_) => {}
            Err(e) => report.problems.push(format!("{}: {:#}", entry.path, e)),
        }
    }

    if manifest.bundle_size() != fs.bundle().len() {
        report.problems.push(format!(
            "Bundle is {} bytes but the manifest describes {}",
            fs.bundle().len(),
            manifest.bundle_size()
        ));
    }

    let from_entries = manifest
        .added_entries
        .iter()
        .map(|e| (e.path.clone(), e.digest.clone()))
        .collect::<BTreeMap<_, _>>();
    if from_entries.len() != manifest.added_entries.len() {
        report
            .problems
            .push("Manifest lists the same path more than once".to_string());
    }
    if from_entries != manifest.path_to_digest {
        report
            .problems
            .push("pathToHash doesn't match the added files".to_string());
    }

    for path in manifest.path_to_protected_digest.keys() {
        if !DETAIL_PATHS.contains(&path.as_str()) {
            report
                .problems
                .push(format!("{}: not a detail file but has a keyed digest", path));
        }
    }

    if let Some(key) = key {
        for (path, digest) in &manifest.path_to_protected_digest {
            match fs.read(path) {
                Ok(contents) if &keyed_digest(&contents, key) != digest => report
                    .problems
                    .push(format!("{}: keyed digest doesn't match contents", path)),
                Ok(_) => {}
                Err(e) => report.problems.push(format!("{}: {:#}", path, e)),
            }
        }
    }

    report
}

/// Verify a bundle, failing if anything is inconsistent
pub fn verify_bundle(fs: &FS, key: Option<&SecretKey>) -> Result<()> {
    let report = check_bundle(fs, key);
    for problem in &report.problems {
        eprintln!("{}", problem);
    }

    if !report.is_ok() {
        bail!(
            "Bundle failed verification: {} problems in {} files",
            report.problems.len(),
            report.checked
        );
    }

    eprintln!("Verified {} files", report.checked);
    Ok(())
}
