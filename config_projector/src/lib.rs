//! Projection engine for the config projector.
//!
//! A [`Manifest`] lists configuration sources living under a
//! [`ContentRoot`]: single files, glob patterns, or JSON and YAML documents
//! from which fields are extracted with `$`-rooted paths. Projecting a
//! manifest yields a [`ConfigBundle`] of output keys and contents, which
//! [`ConfigMap::from_bundle`] wraps in a labelled Kubernetes `ConfigMap`.
//!
//! ```rust,no_run
//! use config_projector::{BundleLabels, ConfigMap, ContentRoot, Manifest};
//!
//! # fn main() -> Result<(), config_projector::ProjectionError> {
//! let root = ContentRoot::open("config-repo")?;
//! let manifest = Manifest::from_yaml_str(
//!     "name: web\nnamespace: apps\ndata:\n  - source: app.conf\n",
//! )?;
//! let map = ConfigMap::from_bundle(
//!     manifest.project(&root)?,
//!     &BundleLabels::with_generation("42"),
//! );
//! let document = map.to_yaml()?;
//! # let _ = document;
//! # Ok(())
//! # }
//! ```

mod coerce;
mod content_root;
mod envelope;
mod error;
mod manifest;
mod path;
mod source;
mod value;
mod yaml;

pub use coerce::coerce_to_bytes;
pub use content_root::ContentRoot;
pub use envelope::{BundleLabels, ConfigMap, DEFAULT_MANAGED_LABEL, DEFAULT_VERSION_LABEL};
pub use error::{ProjectionError, ProjectionResult};
pub use manifest::{ConfigBundle, Manifest};
pub use path::ExtractionPath;
pub use source::{OutputFormat, Projection, SourceDescriptor, SourceFormat};
pub use value::Value;
