//! Command-line surface of `config-projector`.
//!
//! Every flag is optional at parse time. Values left unset here fall through
//! to the environment, the settings file and the built-in defaults.

use camino::Utf8PathBuf;
use clap::Parser;
use serde::Serialize;

/// Flags accepted by the `config-projector` binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser, Serialize)]
#[command(
    name = "config-projector",
    bin_name = "config-projector",
    about = "Project configuration sources into Kubernetes ConfigMap documents",
    version
)]
pub struct Cli {
    /// TOML settings file layered beneath the environment and flags.
    #[arg(long = "config", short = 'c', value_name = "PATH")]
    #[serde(skip)]
    pub config_path: Option<Utf8PathBuf>,

    /// Enable debug logging.
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub debug: bool,

    /// Root of the configuration checkout. Source locations are relative to it.
    #[arg(long, value_name = "DIR")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_repo: Option<Utf8PathBuf>,

    /// Directory searched recursively for `*.yaml` manifests.
    #[arg(long, value_name = "DIR")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifests: Option<Utf8PathBuf>,

    /// Directory the rendered ConfigMaps are written to.
    #[arg(long, value_name = "DIR")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Utf8PathBuf>,

    /// Generation label value; defaults to the current Unix timestamp.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<String>,

    /// Label key carrying the generation.
    #[arg(long, value_name = "KEY")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_version_key: Option<String>,

    /// Label key set to `true` on every rendered ConfigMap.
    #[arg(long, value_name = "KEY")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_managed_key: Option<String>,

    /// Largest rendered ConfigMap accepted, in bytes.
    #[arg(long, value_name = "BYTES")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_limit: Option<usize>,
}
