//! Field extraction from JSON and YAML sources.

use std::collections::BTreeMap;

use camino::Utf8Path;
use serde_json::Value as JsonValue;
use tracing::debug;

use super::{OutputFormat, Projection, SourceDescriptor};
use crate::coerce::coerce_to_bytes;
use crate::content_root::ContentRoot;
use crate::error::{ProjectionError, ProjectionResult};
use crate::path::ExtractionPath;
use crate::value::Value;

/// Document syntax of a structured source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Decoder {
    Json,
    Yaml,
}

impl Decoder {
    fn decode(self, path: &Utf8Path, bytes: &[u8]) -> ProjectionResult<Value> {
        match self {
            Self::Json => serde_json::from_slice::<JsonValue>(bytes)
                .map(Value::from)
                .map_err(|err| ProjectionError::decode(path, err)),
            Self::Yaml => {
                let text =
                    std::str::from_utf8(bytes).map_err(|err| ProjectionError::decode(path, err))?;
                crate::yaml::from_str(text).map_err(|err| ProjectionError::decode(path, err))
            }
        }
    }
}

impl SourceDescriptor {
    pub(super) fn project_structured(
        &self,
        root: &ContentRoot,
        decoder: Decoder,
    ) -> ProjectionResult<Projection> {
        self.check_extractors()?;
        let output_file = self
            .output_file
            .clone()
            .ok_or(ProjectionError::OutputFileRequired)?;
        let location = Utf8Path::new(&self.location);
        let bytes = root.read(location)?;
        let document = decoder.decode(location, &bytes)?;

        if let Some(extract) = &self.extract {
            let value = ExtractionPath::parse(extract)?.resolve(&document, location)?;
            debug!(
                source = %self.location,
                path = %extract,
                kind = value.kind(),
                "extracted value"
            );
            return Ok(Projection::from([(output_file, coerce_to_bytes(&value)?)]));
        }

        let mut fields = BTreeMap::new();
        for (label, path) in &self.field_extractions {
            let value = ExtractionPath::parse(path)?.resolve(&document, location)?;
            fields.insert(label.clone(), value);
        }
        debug!(source = %self.location, fields = fields.len(), "extracted fields");
        let encoded = self.encode(&output_file, &fields)?;
        Ok(Projection::from([(output_file, encoded)]))
    }

    /// Extractor and output format combinations accepted at projection time.
    fn check_extractors(&self) -> ProjectionResult<()> {
        let structured_output = matches!(
            self.output_format,
            Some(OutputFormat::Json | OutputFormat::Yaml)
        );
        if !self.field_extractions.is_empty() && !structured_output {
            return Err(self.unsupported_output());
        }
        if self.extract.is_some() {
            if self.output_format != Some(OutputFormat::Raw) {
                return Err(self.unsupported_output());
            }
            if !self.field_extractions.is_empty() {
                return Err(ProjectionError::MultipleExtractorsFound);
            }
        }
        if self.lacks_extraction() {
            return Err(ProjectionError::OutputFormatRequiresExtractors);
        }
        Ok(())
    }

    fn unsupported_output(&self) -> ProjectionError {
        ProjectionError::UnsupportedOutputFormat {
            found: self
                .output_format
                .as_ref()
                .map_or_else(String::new, ToString::to_string),
        }
    }

    fn encode(
        &self,
        output_file: &str,
        fields: &BTreeMap<String, Value>,
    ) -> ProjectionResult<Vec<u8>> {
        let encode_error = |format: &str, source: Box<dyn std::error::Error + Send + Sync>| {
            ProjectionError::Encode {
                format: format.to_owned(),
                output_file: output_file.to_owned(),
                source,
            }
        };
        match &self.output_format {
            Some(OutputFormat::Json) => {
                let object: serde_json::Map<String, JsonValue> = fields
                    .iter()
                    .map(|(label, value)| (label.clone(), value.to_json()))
                    .collect();
                serde_json::to_vec(&JsonValue::Object(object))
                    .map_err(|err| encode_error("json", err.into()))
            }
            Some(OutputFormat::Yaml) => serde_yaml::to_string(fields)
                .map(String::into_bytes)
                .map_err(|err| encode_error("yaml", err.into())),
            _ => Err(self.unsupported_output()),
        }
    }
}
