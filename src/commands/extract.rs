use std::{fs, path::Path};

use anyhow::{Context, Result};
use glob::Pattern;

use crate::{bundle_fs::FS, commands::matches_any, path::check_manifest_path};

/// Extract files to disk matching a glob pattern. Returns how many were written.
pub fn extract_files(fs: &FS, patterns: &[Pattern], output_folder: &Path) -> Result<usize> {
    let filenames = fs
        .list()
        .filter(|filename| matches_any(patterns, filename))
        .collect::<Vec<_>>();

    let extracted = fs
        .batch_read(&filenames)
        // Print and filter out errors
        .filter_map(|f| match f {
            Ok(x) => Some(x),
            Err((path, e)) => {
                eprintln!("Failed to extract file: {:?}: {:?}", path, e);
                None
            }
        })
        .map(|(filename, contents)| -> Result<_, anyhow::Error> {
            // `..` or an absolute path would land outside the output folder
            check_manifest_path(filename)?;
            let out_filename = output_folder.join(filename);
            if let Some(parent) = out_filename.parent() {
                fs::create_dir_all(parent).context("Failed to create folder")?;
            }

            fs::write(&out_filename, &contents)
                .with_context(|| format!("Failed to write file: {:?}", out_filename))?;

            Ok(filename)
        })
        // Report results
        .filter(|result| match result {
            Ok(filename) => {
                eprintln!("Extracted file: {}", filename);
                true
            }
            Err(e) => {
                eprintln!("Failed to extract file: {:?}", e);
                false
            }
        })
        .count();

    Ok(extracted)
}
