//! YAML decoding backed by `serde-saphyr`.

use serde::de::DeserializeOwned;
use serde_saphyr::Options;

/// Decode YAML contents using YAML 1.2 boolean semantics.
///
/// Only `true` and `false` are booleans; values such as `yes` or `on` stay
/// strings.
pub(crate) fn from_str<T: DeserializeOwned>(contents: &str) -> Result<T, serde_saphyr::Error> {
    serde_saphyr::from_str_with_options(
        contents,
        Options {
            strict_booleans: true,
            ..Options::default()
        },
    )
}
