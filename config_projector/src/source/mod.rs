//! Source descriptors: one configuration input of a manifest.
//!
//! A descriptor is decoded from a manifest entry, defaulted once with
//! [`SourceDescriptor::set_defaults`], validated once with
//! [`SourceDescriptor::validate`] and then projected into output keys with
//! [`SourceDescriptor::project`].

mod format;
mod project;
mod structured;

use std::collections::BTreeMap;
use std::fmt;

use camino::Utf8Path;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::content_root::ContentRoot;
use crate::error::{ProjectionError, ProjectionResult};
use crate::path::ExtractionPath;

pub use format::{OutputFormat, SourceFormat};

/// Output key to projected content bytes.
pub type Projection = BTreeMap<String, Vec<u8>>;

type Rule<T> = (fn(&SourceDescriptor) -> bool, T);

/// Ordered inference table for an unset `source_format`; first match wins.
const SOURCE_FORMAT_RULES: [Rule<SourceFormat>; 4] = [
    (SourceDescriptor::has_glob_location, SourceFormat::Glob),
    (SourceDescriptor::lacks_extraction, SourceFormat::File),
    (SourceDescriptor::extracts_from_json_file, SourceFormat::Json),
    (SourceDescriptor::extracts_from_yaml_file, SourceFormat::Yaml),
];

/// Ordered inference table for an unset `output_format`; first match wins.
const OUTPUT_FORMAT_RULES: [Rule<OutputFormat>; 4] = [
    (SourceDescriptor::maps_fields_from_json_file, OutputFormat::Json),
    (SourceDescriptor::maps_fields_from_yaml_file, OutputFormat::Yaml),
    (SourceDescriptor::is_glob_format, OutputFormat::Raw),
    (SourceDescriptor::projects_single_value, OutputFormat::Raw),
];

/// One configuration input declared by a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceDescriptor {
    #[serde(rename = "source", alias = "location")]
    location: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    output_file: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    source_format: Option<SourceFormat>,
    #[serde(default, deserialize_with = "empty_as_none")]
    output_format: Option<OutputFormat>,
    #[serde(default, deserialize_with = "empty_as_none")]
    extract: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    field_extractions: BTreeMap<String, String>,
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.is_empty()).map(T::from))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl SourceDescriptor {
    /// Create a descriptor for `location` with every optional field unset.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            output_file: None,
            source_format: None,
            output_format: None,
            extract: None,
            field_extractions: BTreeMap::new(),
        }
    }

    /// Set the output key.
    #[must_use]
    pub fn with_output_file(mut self, output_file: impl Into<String>) -> Self {
        self.output_file = Some(output_file.into());
        self
    }

    /// Set the source format.
    #[must_use]
    pub fn with_source_format(mut self, format: SourceFormat) -> Self {
        self.source_format = Some(format);
        self
    }

    /// Set the output format.
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Set the single extraction path.
    #[must_use]
    pub fn with_extract(mut self, path: impl Into<String>) -> Self {
        self.extract = Some(path.into());
        self
    }

    /// Add a labelled extraction path.
    #[must_use]
    pub fn with_field_extraction(
        mut self,
        label: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        self.field_extractions.insert(label.into(), path.into());
        self
    }

    /// Relative path or glob pattern of the source.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Explicit or inferred output key.
    #[must_use]
    pub fn output_file(&self) -> Option<&str> {
        self.output_file.as_deref()
    }

    /// Explicit or inferred source format.
    #[must_use]
    pub const fn source_format(&self) -> Option<&SourceFormat> {
        self.source_format.as_ref()
    }

    /// Explicit or inferred output format.
    #[must_use]
    pub const fn output_format(&self) -> Option<&OutputFormat> {
        self.output_format.as_ref()
    }

    /// Single extraction path, if any.
    #[must_use]
    pub fn extract(&self) -> Option<&str> {
        self.extract.as_deref()
    }

    /// Labelled extraction paths, sorted by label.
    #[must_use]
    pub const fn field_extractions(&self) -> &BTreeMap<String, String> {
        &self.field_extractions
    }

    /// Fill in unset formats and the output key.
    ///
    /// Already populated fields are never changed, so calling this more than
    /// once has no further effect.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::UnableToInferSourceFormat`] or
    /// [`ProjectionError::UnableToInferOutputFormat`] when a format is unset
    /// and no inference rule applies.
    pub fn set_defaults(&mut self) -> ProjectionResult<()> {
        if self.source_format.is_none() {
            let inferred = self.infer(&SOURCE_FORMAT_RULES).ok_or_else(|| {
                ProjectionError::UnableToInferSourceFormat {
                    location: self.location.clone(),
                }
            })?;
            debug!(source = %self.location, format = %inferred, "inferred source format");
            self.source_format = Some(inferred);
        }
        if self.output_format.is_none() {
            let inferred = self.infer(&OUTPUT_FORMAT_RULES).ok_or_else(|| {
                ProjectionError::UnableToInferOutputFormat {
                    location: self.location.clone(),
                }
            })?;
            debug!(source = %self.location, format = %inferred, "inferred output format");
            self.output_format = Some(inferred);
        }
        if self.output_file.is_none()
            && self.output_format == Some(OutputFormat::Raw)
            && self.source_format == Some(SourceFormat::File)
        {
            self.output_file = Utf8Path::new(&self.location)
                .file_name()
                .map(str::to_owned);
        }
        Ok(())
    }

    fn infer<T: Clone>(&self, rules: &[Rule<T>]) -> Option<T> {
        rules
            .iter()
            .find(|(applies, _)| applies(self))
            .map(|(_, result)| result.clone())
    }

    /// Check the defaulted descriptor for contradictory or unsafe settings.
    ///
    /// Rules are applied in a fixed order and the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns the [`ProjectionError`] describing the first violated rule.
    pub fn validate(&self) -> ProjectionResult<()> {
        let source_format = self.checked_source_format()?;
        let output_format = self.checked_output_format()?;
        let glob = self.has_glob_location() || *source_format == SourceFormat::Glob;
        if glob && *output_format != OutputFormat::Raw {
            return Err(ProjectionError::SourceGlobWithRawOutput);
        }
        if *source_format != SourceFormat::Glob && self.output_file.is_none() {
            return Err(ProjectionError::OutputFileRequired);
        }
        if self.lacks_extraction() && *output_format != OutputFormat::Raw {
            return Err(ProjectionError::OutputFormatRequiresExtractors);
        }
        if *output_format == OutputFormat::Raw && !self.field_extractions.is_empty() {
            return Err(ProjectionError::WrongOutputFormatWithFieldExtractions);
        }
        if self.output_file.is_some() && *source_format == SourceFormat::Glob {
            return Err(ProjectionError::FormatGlobRequiresNoOutputFile);
        }
        if is_absolute(&self.location) {
            return Err(ProjectionError::AbsolutePathSource {
                location: self.location.clone(),
            });
        }
        if self.extract.is_some() && !self.field_extractions.is_empty() {
            return Err(ProjectionError::MultipleExtractorsFound);
        }
        for path in self.extract.iter().chain(self.field_extractions.values()) {
            ExtractionPath::parse(path)?;
        }
        Ok(())
    }

    fn checked_source_format(&self) -> ProjectionResult<&SourceFormat> {
        match &self.source_format {
            Some(SourceFormat::Unsupported(found)) => {
                Err(ProjectionError::UnsupportedSourceFormat {
                    found: found.clone(),
                })
            }
            Some(format) => Ok(format),
            None => Err(ProjectionError::UnsupportedSourceFormat {
                found: String::new(),
            }),
        }
    }

    fn checked_output_format(&self) -> ProjectionResult<&OutputFormat> {
        match &self.output_format {
            Some(OutputFormat::Unsupported(found)) => {
                Err(ProjectionError::UnsupportedOutputFormat {
                    found: found.clone(),
                })
            }
            Some(format) => Ok(format),
            None => Err(ProjectionError::UnsupportedOutputFormat {
                found: String::new(),
            }),
        }
    }

    /// Project the source into output keys, reading through `root`.
    ///
    /// # Errors
    ///
    /// Returns a [`ProjectionError`] when the source cannot be read, decoded
    /// or extracted, or when glob matches collide.
    pub fn project(&self, root: &ContentRoot) -> ProjectionResult<Projection> {
        debug!(source = %self, "projecting source");
        match &self.source_format {
            Some(SourceFormat::Glob) => self.project_glob(root),
            Some(SourceFormat::File) => self.project_file(root),
            Some(SourceFormat::Json) => self.project_structured(root, structured::Decoder::Json),
            Some(SourceFormat::Yaml) => self.project_structured(root, structured::Decoder::Yaml),
            Some(SourceFormat::Unsupported(found)) => {
                Err(ProjectionError::UnsupportedSourceType {
                    found: found.clone(),
                })
            }
            None => Err(ProjectionError::UnsupportedSourceType {
                found: String::new(),
            }),
        }
    }

    fn has_glob_location(&self) -> bool {
        self.location.contains('*')
    }

    fn requests_extraction(&self) -> bool {
        self.extract.is_some() || !self.field_extractions.is_empty()
    }

    fn lacks_extraction(&self) -> bool {
        !self.requests_extraction()
    }

    fn extracts_from_json_file(&self) -> bool {
        self.requests_extraction() && self.location.ends_with(".json")
    }

    fn extracts_from_yaml_file(&self) -> bool {
        self.requests_extraction() && self.location.ends_with(".yaml")
    }

    fn maps_fields_from_json_file(&self) -> bool {
        !self.field_extractions.is_empty() && self.location.ends_with(".json")
    }

    fn maps_fields_from_yaml_file(&self) -> bool {
        !self.field_extractions.is_empty() && self.location.ends_with(".yaml")
    }

    fn is_glob_format(&self) -> bool {
        self.source_format == Some(SourceFormat::Glob)
    }

    fn projects_single_value(&self) -> bool {
        match &self.source_format {
            Some(SourceFormat::File) => self.lacks_extraction(),
            Some(SourceFormat::Json | SourceFormat::Yaml) => self.extract.is_some(),
            _ => false,
        }
    }
}

fn is_absolute(location: &str) -> bool {
    let path = Utf8Path::new(location);
    path.is_absolute() || path.has_root()
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source{{{}:", self.location)?;
        if let Some(format) = &self.source_format {
            write!(f, "{format}")?;
        }
        f.write_str("} output=")?;
        if let Some(format) = &self.output_format {
            write!(f, "{format}")?;
        }
        write!(
            f,
            " file={} extract={} fields={:?}",
            self.output_file.as_deref().unwrap_or_default(),
            self.extract.as_deref().unwrap_or_default(),
            self.field_extractions,
        )
    }
}
