use std::path::{Component, Path};

use anyhow::{bail, ensure, Context, Result};

/// Turn a path under `root` into the forward-slash form stored in the manifest, so manifests
/// built on different platforms agree.
pub fn manifest_path(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .with_context(|| format!("Path {:?} is not under asset root {:?}", path, root))?;

    let mut segments = vec![];
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                let segment = segment
                    .to_str()
                    .with_context(|| format!("Path is not valid UTF-8: {:?}", path))?;
                segments.push(segment);
            }
            Component::CurDir => {}
            other => bail!("Unexpected path component {:?} in {:?}", other, path),
        }
    }

    Ok(segments.join("/"))
}

/// Check a path read from a manifest stays inside whatever folder it gets joined onto: relative,
/// non-empty, with no `.` or `..` segments.
pub fn check_manifest_path(path: &str) -> Result<()> {
    let components = Path::new(path).components().collect::<Vec<_>>();
    ensure!(!components.is_empty(), "Empty path in manifest");

    for component in components {
        match component {
            Component::Normal(_) => {}
            other => bail!("Unsafe path in manifest: {:?} ({:?})", path, other),
        }
    }

    Ok(())
}
