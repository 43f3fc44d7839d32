//! Error types for the `config-projector` binary.
//!
//! `CliError` wraps projection failures with the manifest or path they came
//! from, alongside the settings, discovery and output failures that only the
//! command-line front end can hit. Any of them aborts the whole run.

use camino::Utf8PathBuf;
use config_projector::ProjectionError;
use thiserror::Error;

/// Result alias used throughout the CLI crate.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Errors raised while loading settings or projecting manifests.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    /// Layered settings could not be merged or extracted.
    #[error("failed to load settings: {0}")]
    Settings(#[from] Box<figment::Error>),

    /// An explicit `--config` file does not exist.
    #[error("settings file {path} does not exist")]
    MissingSettingsFile {
        /// Requested settings file.
        path: Utf8PathBuf,
    },

    /// A required setting was not supplied by any layer.
    #[error("{name} requires an argument")]
    MissingSetting {
        /// Setting name as spelt on the command line.
        name: &'static str,
    },

    /// A directory setting points somewhere that is not a directory.
    #[error("{name} argument {path} is not a directory")]
    NotADirectory {
        /// Setting name as spelt on the command line.
        name: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },

    /// The generation label resolved to an empty string.
    #[error("generation argument must be specified")]
    EmptyGeneration,

    /// The tracing subscriber could not be installed.
    #[error("failed to initialise logging: {0}")]
    Logging(Box<dyn std::error::Error + Send + Sync>),

    /// A directory could not be opened, listed or read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path being accessed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration checkout could not be opened.
    #[error("unable to open config repo {path}: {source}")]
    ContentRoot {
        /// Configured checkout root.
        path: Utf8PathBuf,
        /// Underlying projection error.
        #[source]
        source: Box<ProjectionError>,
    },

    /// A manifest failed to decode, default or validate.
    #[error("{path}: {source}")]
    Manifest {
        /// Manifest file.
        path: Utf8PathBuf,
        /// Underlying projection error.
        #[source]
        source: Box<ProjectionError>,
    },

    /// Two manifest files declare the same namespace and name.
    #[error("duplicate projection mapping found at namespace={namespace} name={name} file={path}")]
    DuplicateManifest {
        /// Shared namespace.
        namespace: String,
        /// Shared name.
        name: String,
        /// Second file declaring the identity.
        path: Utf8PathBuf,
    },

    /// The manifest directory holds no `*.yaml` files.
    #[error("no manifests found under {path}")]
    NoManifests {
        /// Manifest directory searched.
        path: Utf8PathBuf,
    },

    /// Projecting or rendering a manifest failed.
    #[error("unable to project {id}: {source}")]
    Projection {
        /// `namespace/name` of the manifest.
        id: String,
        /// Underlying projection error.
        #[source]
        source: Box<ProjectionError>,
    },

    /// A rendered config map is larger than the configured limit.
    #[error(
        "generated ConfigMap for {id} was {size} bytes, exceeding size limit of {limit} bytes; \
         you may want to split this projection into multiple ConfigMaps"
    )]
    SizeLimitExceeded {
        /// `namespace/name` of the manifest.
        id: String,
        /// Rendered size in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// A rendered config map could not be written.
    #[error("unable to write config to {path}: {source}")]
    Write {
        /// Destination file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Settings(Box::new(err))
    }
}
