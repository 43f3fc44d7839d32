//! Manifests: named, namespaced collections of source descriptors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::content_root::ContentRoot;
use crate::error::{ProjectionError, ProjectionResult};
use crate::source::SourceDescriptor;

const MAX_NAME_LEN: usize = 253;

#[expect(clippy::expect_used, reason = "the pattern is a checked literal")]
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9\-.]+$").expect("valid name pattern"));

/// A named collection of sources projected into one config bundle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    data: Vec<SourceDescriptor>,
}

/// Projected contents of one manifest, keyed by output file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBundle {
    name: String,
    namespace: String,
    data: BTreeMap<String, String>,
}

impl ConfigBundle {
    /// Name of the manifest the bundle was projected from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace of the manifest the bundle was projected from.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Output key to UTF-8 content.
    #[must_use]
    pub const fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    /// Consume the bundle, keeping only its contents.
    #[must_use]
    pub fn into_data(self) -> BTreeMap<String, String> {
        self.data
    }
}

impl Manifest {
    /// Build a manifest from its parts without defaulting or validating it.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        data: Vec<SourceDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            data,
        }
    }

    /// Decode a manifest, fill in defaults and validate it.
    ///
    /// Unknown keys are rejected at every level of the document.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Manifest`] when the YAML cannot be decoded,
    /// or the first inference or validation failure.
    pub fn from_yaml_str(contents: &str) -> ProjectionResult<Self> {
        let mut manifest: Self = crate::yaml::from_str(contents)?;
        manifest.set_defaults()?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Manifest name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Manifest namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Sources in declaration order.
    #[must_use]
    pub fn data(&self) -> &[SourceDescriptor] {
        &self.data
    }

    /// Default every source descriptor.
    ///
    /// # Errors
    ///
    /// Returns the first descriptor's inference failure.
    pub fn set_defaults(&mut self) -> ProjectionResult<()> {
        self.data.iter_mut().try_for_each(SourceDescriptor::set_defaults)
    }

    /// Validate the name, the namespace and every source descriptor.
    ///
    /// # Errors
    ///
    /// Returns the first failure found.
    pub fn validate(&self) -> ProjectionResult<()> {
        if self.name.is_empty() {
            return Err(ProjectionError::MissingName);
        }
        if self.namespace.is_empty() {
            return Err(ProjectionError::MissingNamespace);
        }
        if !is_valid_name(&self.name) {
            return Err(ProjectionError::InvalidName {
                name: self.name.clone(),
            });
        }
        if !is_valid_name(&self.namespace) {
            return Err(ProjectionError::InvalidNamespace {
                namespace: self.namespace.clone(),
            });
        }
        self.data.iter().try_for_each(SourceDescriptor::validate)
    }

    /// Project every source in order and merge the results.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::DuplicateKey`] when two sources produce the
    /// same key, [`ProjectionError::NonUtf8Content`] for binary content, or
    /// the first projection failure.
    pub fn project(&self, root: &ContentRoot) -> ProjectionResult<ConfigBundle> {
        let mut data = BTreeMap::new();
        for descriptor in &self.data {
            for (key, bytes) in descriptor.project(root)? {
                if data.contains_key(&key) {
                    return Err(ProjectionError::DuplicateKey { key });
                }
                let Ok(content) = String::from_utf8(bytes) else {
                    return Err(ProjectionError::NonUtf8Content { key });
                };
                debug!(
                    manifest = %self.id(),
                    key = %key,
                    bytes = content.len(),
                    "merged projected key"
                );
                data.insert(key, content);
            }
        }
        Ok(ConfigBundle {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            data,
        })
    }

    /// `namespace/name` identity of the manifest.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

fn is_valid_name(candidate: &str) -> bool {
    candidate.len() <= MAX_NAME_LEN && NAME_PATTERN.is_match(candidate)
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sources: Vec<String> = self.data.iter().map(ToString::to_string).collect();
        sources.sort();
        write!(f, "{}({})", self.id(), sources.join(","))
    }
}
