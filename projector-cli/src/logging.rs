//! Tracing subscriber installation.

use tracing_subscriber::EnvFilter;

use crate::error::{CliError, Result};

/// Directive used when `RUST_LOG` is unset or unparsable.
#[must_use]
pub const fn default_directive(debug: bool) -> &'static str {
    if debug { "debug" } else { "info" }
}

/// Install a `fmt` subscriber writing to standard error.
///
/// `RUST_LOG` takes precedence over the `debug` setting.
///
/// # Errors
///
/// Returns [`CliError::Logging`] when a global subscriber is already set.
pub fn init(debug: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(CliError::Logging)
}

#[cfg(test)]
mod tests {
    use super::default_directive;
    use rstest::rstest;

    #[rstest]
    #[case(false, "info")]
    #[case(true, "debug")]
    fn debug_flag_selects_level(#[case] debug: bool, #[case] expected: &str) {
        assert_eq!(default_directive(debug), expected);
    }
}
