//! Source and output format names.
//!
//! Unknown names are kept rather than rejected while decoding so that
//! validation can report them with the same error as other rule violations.

use std::fmt;

/// How a source location is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFormat {
    /// A single file projected verbatim.
    File,
    /// A glob pattern; every matching file is projected verbatim.
    Glob,
    /// A YAML document to extract fields from.
    Yaml,
    /// A JSON document to extract fields from.
    Json,
    /// Any other name found in a manifest.
    Unsupported(String),
}

/// How projected content is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    /// File bytes, or the text form of a single extracted value.
    Raw,
    /// A JSON object of extracted fields.
    Json,
    /// A YAML mapping of extracted fields.
    Yaml,
    /// Any other name found in a manifest.
    Unsupported(String),
}

impl From<String> for SourceFormat {
    fn from(name: String) -> Self {
        match name.as_str() {
            "file" => Self::File,
            "glob" => Self::Glob,
            "yaml" => Self::Yaml,
            "json" => Self::Json,
            _ => Self::Unsupported(name),
        }
    }
}

impl From<String> for OutputFormat {
    fn from(name: String) -> Self {
        match name.as_str() {
            "raw" => Self::Raw,
            "json" => Self::Json,
            "yaml" => Self::Yaml,
            _ => Self::Unsupported(name),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Glob => f.write_str("glob"),
            Self::Yaml => f.write_str("yaml"),
            Self::Json => f.write_str("json"),
            Self::Unsupported(name) => f.write_str(name),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => f.write_str("raw"),
            Self::Json => f.write_str("json"),
            Self::Yaml => f.write_str("yaml"),
            Self::Unsupported(name) => f.write_str(name),
        }
    }
}
