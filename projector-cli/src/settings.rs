//! Layered settings for a projection run.
//!
//! Layers are merged with [`figment`], lowest precedence first: built-in
//! defaults, the optional TOML file named by `--config`, environment
//! variables prefixed `CONFIG_PROJECTOR_`, then command-line flags.

use camino::{Utf8Path, Utf8PathBuf};
use config_projector::{BundleLabels, DEFAULT_MANAGED_LABEL, DEFAULT_VERSION_LABEL};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Deserializer, Serialize};

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Prefix shared by every environment variable the tool reads.
pub const ENV_PREFIX: &str = "CONFIG_PROJECTOR_";

/// Rendered ConfigMaps larger than this many bytes are refused by default.
pub const DEFAULT_SIZE_LIMIT: usize = 500_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Layered {
    debug: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config_repo: Option<Utf8PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    manifests: Option<Utf8PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<Utf8PathBuf>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text_or_integer"
    )]
    generation: Option<String>,
    label_version_key: String,
    label_managed_key: String,
    size_limit: usize,
}

impl Default for Layered {
    fn default() -> Self {
        Self {
            debug: false,
            config_repo: None,
            manifests: None,
            output: None,
            generation: None,
            label_version_key: DEFAULT_VERSION_LABEL.to_owned(),
            label_managed_key: DEFAULT_MANAGED_LABEL.to_owned(),
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }
}

/// Environment values such as `CONFIG_PROJECTOR_GENERATION=42` arrive as
/// integers.
fn text_or_integer<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(
        Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
            Scalar::Text(text) => text,
            Scalar::Unsigned(number) => number.to_string(),
            Scalar::Signed(number) => number.to_string(),
        }),
    )
}

/// Fully resolved and checked settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Emit debug logs.
    pub debug: bool,
    /// Root of the configuration checkout.
    pub config_repo: Utf8PathBuf,
    /// Directory holding manifests.
    pub manifests: Utf8PathBuf,
    /// Directory rendered ConfigMaps are written to.
    pub output: Utf8PathBuf,
    /// Generation label value.
    pub generation: String,
    /// Label key carrying the generation.
    pub label_version_key: String,
    /// Label key marking managed ConfigMaps.
    pub label_managed_key: String,
    /// Largest rendered ConfigMap accepted, in bytes.
    pub size_limit: usize,
}

impl Settings {
    /// Merge every layer and check the result.
    ///
    /// `now` is the Unix timestamp used when no generation is configured.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingSettingsFile`] when `--config` names a
    /// missing file, [`CliError::Settings`] when a layer cannot be merged,
    /// and the first [`Settings::check`] failure otherwise.
    pub fn load(cli: &Cli, now: i64) -> Result<Self> {
        Self::from_figment(&figment(cli)?, now)
    }

    fn from_figment(figment: &Figment, now: i64) -> Result<Self> {
        let layered: Layered = figment.extract()?;
        let settings = Self {
            debug: layered.debug,
            config_repo: required("config-repo", layered.config_repo)?,
            manifests: required("manifests", layered.manifests)?,
            output: required("output", layered.output)?,
            generation: layered.generation.unwrap_or_else(|| now.to_string()),
            label_version_key: layered.label_version_key,
            label_managed_key: layered.label_managed_key,
            size_limit: layered.size_limit,
        };
        settings.check()?;
        Ok(settings)
    }

    /// Check that every directory exists and the generation is not empty.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::NotADirectory`] or [`CliError::EmptyGeneration`].
    pub fn check(&self) -> Result<()> {
        for (name, path) in [
            ("manifests", &self.manifests),
            ("output", &self.output),
            ("config-repo", &self.config_repo),
        ] {
            ensure_dir(name, path)?;
        }
        if self.generation.is_empty() {
            return Err(CliError::EmptyGeneration);
        }
        Ok(())
    }

    /// Labels attached to every rendered ConfigMap.
    #[must_use]
    pub fn labels(&self) -> BundleLabels {
        BundleLabels {
            version_key: self.label_version_key.clone(),
            managed_key: self.label_managed_key.clone(),
            generation: self.generation.clone(),
        }
    }
}

fn figment(cli: &Cli) -> Result<Figment> {
    let mut figment = Figment::from(Serialized::defaults(Layered::default()));
    if let Some(path) = &cli.config_path {
        if !path.is_file() {
            return Err(CliError::MissingSettingsFile { path: path.clone() });
        }
        figment = figment.merge(Toml::file(path.as_std_path()));
    }
    Ok(figment
        .merge(Env::prefixed(ENV_PREFIX))
        .merge(Serialized::defaults(cli)))
}

fn required(name: &'static str, value: Option<Utf8PathBuf>) -> Result<Utf8PathBuf> {
    value.ok_or(CliError::MissingSetting { name })
}

fn ensure_dir(name: &'static str, path: &Utf8Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(CliError::NotADirectory {
            name,
            path: path.to_path_buf(),
        })
    }
}
