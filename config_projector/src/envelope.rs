//! Kubernetes `ConfigMap` documents wrapping projected bundles.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ProjectionResult;
use crate::manifest::ConfigBundle;

/// Default label key carrying the generation of a rendered config map.
pub const DEFAULT_VERSION_LABEL: &str = "config-projector/config-version";

/// Default label key marking config maps owned by the projector.
pub const DEFAULT_MANAGED_LABEL: &str = "config-projector/managed-configmap";

/// Labels attached to every rendered config map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLabels {
    /// Label key holding [`BundleLabels::generation`].
    pub version_key: String,
    /// Label key set to `"true"`.
    pub managed_key: String,
    /// Value identifying this projection run.
    pub generation: String,
}

impl BundleLabels {
    /// Labels using the default keys and the given generation.
    #[must_use]
    pub fn with_generation(generation: impl Into<String>) -> Self {
        Self {
            version_key: DEFAULT_VERSION_LABEL.to_owned(),
            managed_key: DEFAULT_MANAGED_LABEL.to_owned(),
            generation: generation.into(),
        }
    }
}

/// A `v1` `ConfigMap` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMap {
    api_version: &'static str,
    kind: &'static str,
    metadata: ObjectMeta,
    data: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ObjectMeta {
    name: String,
    namespace: String,
    labels: BTreeMap<String, String>,
}

impl ConfigMap {
    /// Wrap `bundle` in a config map carrying `labels`.
    #[must_use]
    pub fn from_bundle(bundle: ConfigBundle, labels: &BundleLabels) -> Self {
        let metadata = ObjectMeta {
            name: bundle.name().to_owned(),
            namespace: bundle.namespace().to_owned(),
            labels: BTreeMap::from([
                (labels.version_key.clone(), labels.generation.clone()),
                (labels.managed_key.clone(), String::from("true")),
            ]),
        };
        Self {
            api_version: "v1",
            kind: "ConfigMap",
            metadata,
            data: bundle.into_data(),
        }
    }

    /// Config map name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Config map namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    /// Labels attached to the config map.
    #[must_use]
    pub const fn labels(&self) -> &BTreeMap<String, String> {
        &self.metadata.labels
    }

    /// Projected file contents.
    #[must_use]
    pub const fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    /// Render the config map as a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProjectionError::Render`] when serialisation fails.
    pub fn to_yaml(&self) -> ProjectionResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
