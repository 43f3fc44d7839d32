//! Manifest discovery under the manifest directory.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use config_projector::Manifest;
use tracing::debug;

use crate::error::{CliError, Result};

const MANIFEST_SUFFIX: &str = ".yaml";

/// Load every `*.yaml` manifest below `root`.
///
/// Files are visited in sorted path order. The returned manifests are
/// ordered by `namespace/name`.
///
/// # Errors
///
/// Returns [`CliError::Manifest`] naming the first file that fails to load,
/// [`CliError::DuplicateManifest`] when two files share an identity,
/// [`CliError::NoManifests`] when nothing is found, and [`CliError::Io`]
/// when a directory cannot be read.
pub fn discover(root: &Utf8Path) -> Result<Vec<Manifest>> {
    let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(|source| CliError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    collect(&dir, root, Utf8Path::new(""), &mut files)?;
    files.sort();

    let mut manifests = BTreeMap::new();
    for relative in files {
        let path = root.join(&relative);
        let contents = dir.read_to_string(&relative).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?;
        let manifest = Manifest::from_yaml_str(&contents).map_err(|err| CliError::Manifest {
            path: path.clone(),
            source: Box::new(err),
        })?;
        let id = manifest.id();
        if manifests.contains_key(&id) {
            return Err(CliError::DuplicateManifest {
                namespace: manifest.namespace().to_owned(),
                name: manifest.name().to_owned(),
                path,
            });
        }
        debug!(manifest = %manifest, path = %path, "loaded manifest");
        manifests.insert(id, manifest);
    }
    if manifests.is_empty() {
        return Err(CliError::NoManifests {
            path: root.to_path_buf(),
        });
    }
    Ok(manifests.into_values().collect())
}

fn collect(
    dir: &Dir,
    root: &Utf8Path,
    base: &Utf8Path,
    files: &mut Vec<Utf8PathBuf>,
) -> Result<()> {
    let listing_error = |source| CliError::Io {
        path: root.join(base),
        source,
    };
    for entry_result in dir.read_dir(".").map_err(listing_error)? {
        let entry = entry_result.map_err(listing_error)?;
        let name = entry.file_name().map_err(listing_error)?;
        let relative = base.join(&name);
        if entry.file_type().map_err(listing_error)?.is_dir() {
            let subdir = entry.open_dir().map_err(listing_error)?;
            collect(&subdir, root, &relative, files)?;
        } else if name.ends_with(MANIFEST_SUFFIX) {
            files.push(relative);
        }
    }
    Ok(())
}
