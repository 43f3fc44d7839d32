//! Command-line front end for the config projector.
//!
//! [`run`] discovers manifests, projects each one against the configuration
//! checkout, wraps the result in a labelled `ConfigMap` and writes it to the
//! output directory. The first failure aborts the run.

pub mod cli;
mod discovery;
pub mod error;
pub mod logging;
mod output;
pub mod settings;

use camino::Utf8PathBuf;
use config_projector::{ConfigMap, ContentRoot};
use tracing::{debug, info};

pub use discovery::discover;
pub use error::{CliError, Result};
pub use output::{OutputDir, check_size, file_name};
pub use settings::Settings;

/// Project every manifest named by `settings`.
///
/// `timestamp` is embedded in each output file name. Returns the files
/// written, in manifest order.
///
/// # Errors
///
/// Returns the first discovery, projection, size or write failure.
pub fn run(settings: &Settings, timestamp: i64) -> Result<Vec<Utf8PathBuf>> {
    let root = ContentRoot::open(&settings.config_repo).map_err(|err| CliError::ContentRoot {
        path: settings.config_repo.clone(),
        source: Box::new(err),
    })?;
    let manifests = discover(&settings.manifests)?;
    let out = OutputDir::open(&settings.output)?;
    let labels = settings.labels();
    debug!(count = manifests.len(), generation = %labels.generation, "projecting manifests");

    let mut written = Vec::with_capacity(manifests.len());
    for manifest in &manifests {
        let id = manifest.id();
        let projection_error = |err| CliError::Projection {
            id: id.clone(),
            source: Box::new(err),
        };
        let bundle = manifest.project(&root).map_err(projection_error)?;
        let rendered = ConfigMap::from_bundle(bundle, &labels)
            .to_yaml()
            .map_err(projection_error)?;
        check_size(&id, &rendered, settings.size_limit)?;
        let name = file_name(manifest.namespace(), manifest.name(), timestamp);
        let path = out.write(&name, &rendered)?;
        info!(manifest = %id, path = %path, bytes = rendered.len(), "wrote ConfigMap");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    //! End-to-end runs over temporary directories.

    use super::{CliError, Settings, run};
    use anyhow::{Result, anyhow, ensure};
    use rstest::rstest;
    use test_helpers::tree::ContentTree;

    const WEB: &str = "\
name: web
namespace: apps
data:
  - source: app.conf
  - source: settings.json
    extract: $.limits.max
    output_file: max-connections
";

    struct Workspace {
        tree: ContentTree,
        settings: Settings,
    }

    fn workspace(size_limit: usize) -> Result<Workspace> {
        let tree = ContentTree::new()?;
        tree.write("repo/app.conf", "listen 8080\n")?;
        tree.write("repo/settings.json", r#"{"limits":{"max":42}}"#)?;
        tree.write("manifests/web.yaml", WEB)?;
        tree.create_dir("out")?;
        let settings = Settings {
            debug: false,
            config_repo: tree.path().join("repo"),
            manifests: tree.path().join("manifests"),
            output: tree.path().join("out"),
            generation: String::from("7"),
            label_version_key: String::from("example.com/version"),
            label_managed_key: String::from("example.com/managed"),
            size_limit,
        };
        Ok(Workspace { tree, settings })
    }

    #[rstest]
    fn writes_one_config_map_per_manifest() -> Result<()> {
        let ws = workspace(500_000)?;
        let written = run(&ws.settings, 1_700_000_000)?;
        ensure!(written.len() == 1, "unexpected outputs {written:?}");
        ensure!(
            ws.tree.file_names("out")? == ["apps--web--1700000000.yaml"],
            "unexpected output names"
        );
        let rendered = ws.tree.read_to_string("out/apps--web--1700000000.yaml")?;
        ensure!(
            rendered.starts_with("apiVersion: v1\nkind: ConfigMap\n"),
            "unexpected document:\n{rendered}"
        );
        ensure!(
            rendered.contains("example.com/version: '7'"),
            "generation label missing:\n{rendered}"
        );
        ensure!(
            rendered.contains("max-connections: '42'"),
            "extracted value missing:\n{rendered}"
        );
        Ok(())
    }

    #[rstest]
    fn oversized_config_maps_abort_the_run() -> Result<()> {
        let ws = workspace(16)?;
        let err = run(&ws.settings, 1)
            .err()
            .ok_or_else(|| anyhow!("run should fail"))?;
        ensure!(
            matches!(err, CliError::SizeLimitExceeded { ref id, limit: 16, .. } if id == "apps/web"),
            "unexpected error: {err:?}"
        );
        ensure!(ws.tree.file_names("out")?.is_empty(), "nothing should be written");
        Ok(())
    }

    #[rstest]
    fn projection_failures_name_the_manifest() -> Result<()> {
        let ws = workspace(500_000)?;
        ws.tree.write(
            "manifests/broken.yaml",
            "name: broken\nnamespace: apps\ndata:\n  - source: missing.conf\n",
        )?;
        let err = run(&ws.settings, 1)
            .err()
            .ok_or_else(|| anyhow!("run should fail"))?;
        ensure!(
            matches!(err, CliError::Projection { ref id, .. } if id == "apps/broken"),
            "unexpected error: {err:?}"
        );
        Ok(())
    }
}
