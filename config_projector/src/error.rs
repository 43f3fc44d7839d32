//! Error types produced while loading manifests and projecting sources.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias for results returned by the projection engine.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Errors that can occur while defaulting, validating or projecting a manifest.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProjectionError {
    /// The source format could not be inferred from the location and extractors.
    #[error("unable to infer source format for '{location}'; set `source_format` explicitly")]
    UnableToInferSourceFormat {
        /// Location of the offending source.
        location: String,
    },

    /// The output format could not be inferred from the source declaration.
    #[error("unable to infer output format for '{location}'; set `output_format` explicitly")]
    UnableToInferOutputFormat {
        /// Location of the offending source.
        location: String,
    },

    /// The declared source format is not one of the supported values.
    #[error("unsupported source format; must be file, glob, yaml, or json")]
    UnsupportedSourceFormat {
        /// Value found in the manifest.
        found: String,
    },

    /// The declared output format is not one of the supported values, or it
    /// cannot be combined with the requested extractors.
    #[error("unsupported output format; must be one of raw, yaml, or json")]
    UnsupportedOutputFormat {
        /// Value found in the manifest.
        found: String,
    },

    /// A glob source asked for structured output.
    #[error("glob sources may only be projected with the raw output format")]
    SourceGlobWithRawOutput,

    /// A single-output projection did not name its output file.
    #[error("output_file field required for this projection type")]
    OutputFileRequired,

    /// A structured output format was requested without any extractor.
    #[error("you cannot use this output format without either `extract` or `field_extractions`")]
    OutputFormatRequiresExtractors,

    /// Raw output cannot hold several extracted fields.
    #[error("raw output cannot be combined with `field_extractions`; use json or yaml output")]
    WrongOutputFormatWithFieldExtractions,

    /// Glob sources produce one output per match and cannot name a single file.
    #[error("source files of glob format cannot specify a `output_file` field for projection")]
    FormatGlobRequiresNoOutputFile,

    /// Sources must be relative to the content root.
    #[error("absolute paths for `source` are not permitted")]
    AbsolutePathSource {
        /// Offending location.
        location: String,
    },

    /// Both `extract` and `field_extractions` were declared.
    #[error("`extract` and `field_extractions` are mutually exclusive")]
    MultipleExtractorsFound,

    /// A descriptor reached projection with a format that has no projector.
    #[error("unsupported source type '{found}' at projection time")]
    UnsupportedSourceType {
        /// Format carried by the descriptor.
        found: String,
    },

    /// The manifest has no name.
    #[error("name is required")]
    MissingName,

    /// The manifest has no namespace.
    #[error("namespace is required")]
    MissingNamespace,

    /// The manifest name is malformed or too long.
    #[error(
        "name must only consist of lower case alphanumeric characters, -, and . and be 253 chars or less"
    )]
    InvalidName {
        /// Offending name.
        name: String,
    },

    /// The manifest namespace is malformed or too long.
    #[error(
        "namespace must only consist of lower case alphanumeric characters, -, and . and be 253 chars or less"
    )]
    InvalidNamespace {
        /// Offending namespace.
        namespace: String,
    },

    /// An extraction path could not be parsed.
    #[error("invalid extraction path '{path}': {reason}")]
    InvalidExtractionPath {
        /// Path expression as written in the manifest.
        path: String,
        /// Description of the syntax problem.
        reason: String,
    },

    /// An extraction path matched no node of the decoded document.
    #[error("extraction path '{path}' did not match in '{document}': {reason}")]
    PathNotFound {
        /// Path expression as written in the manifest.
        path: String,
        /// Document the path was resolved against.
        document: Utf8PathBuf,
        /// Description of the failing step.
        reason: String,
    },

    /// An extracted value has no scalar text representation.
    #[error("unable to extract scalar value, unsupported datatype {found}")]
    UnsupportedDatatype {
        /// Kind of the offending value.
        found: String,
    },

    /// Two glob matches of one source share a base name.
    #[error("existing file projection with name {name} (glob '{pattern}')")]
    DuplicateGlobMatch {
        /// Colliding base name.
        name: String,
        /// Glob pattern that produced both matches.
        pattern: String,
    },

    /// Two sources of one manifest produced the same output key.
    #[error("duplicate projection key {key} in projection sources")]
    DuplicateKey {
        /// Colliding output key.
        key: String,
    },

    /// Projected content could not be stored as text.
    #[error("projected content for key {key} is not valid UTF-8")]
    NonUtf8Content {
        /// Output key holding the content.
        key: String,
    },

    /// A glob pattern could not be compiled.
    #[error("invalid glob pattern '{pattern}': {source}")]
    GlobPattern {
        /// Pattern as expanded against the content root.
        pattern: String,
        /// Underlying pattern error.
        #[source]
        source: glob::PatternError,
    },

    /// A source document could not be decoded.
    #[error("failed to decode '{path}': {source}")]
    Decode {
        /// Document that failed to decode.
        path: Utf8PathBuf,
        /// Underlying decoder error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Extracted fields could not be serialised in the requested format.
    #[error("failed to encode {format} output for '{output_file}': {source}")]
    Encode {
        /// Output format being produced.
        format: String,
        /// Output key being produced.
        output_file: String,
        /// Underlying encoder error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A manifest document could not be decoded.
    #[error("failed to decode manifest: {0}")]
    Manifest(#[from] serde_saphyr::Error),

    /// A config map document could not be rendered.
    #[error("failed to render config map: {0}")]
    Render(#[from] serde_yaml::Error),

    /// Reading from the content root failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that triggered the failure.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ProjectionError {
    /// Construct an [`ProjectionError::Io`] for `path`.
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Construct a [`ProjectionError::Decode`] for `path`.
    pub(crate) fn decode(
        path: impl Into<Utf8PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Decode {
            path: path.into(),
            source: source.into(),
        }
    }
}
