//! Shared text normalization helpers for behavioural test suites.

/// Trims `value` and strips one layer of matching single or double quotes.
///
/// Feature files quote step arguments so that embedded spaces and braces
/// survive; mismatched quotes are left in place.
#[must_use]
pub fn unquote(value: &str) -> &str {
    let trimmed = value.trim();
    ['"', '\'']
        .into_iter()
        .find_map(|quote| trimmed.strip_prefix(quote)?.strip_suffix(quote))
        .unwrap_or(trimmed)
}

/// Owned, unquoted form of a step placeholder with inner padding trimmed.
#[must_use]
pub fn normalize_scalar(value: &str) -> String {
    unquote(value).trim().to_owned()
}

/// Expands `\n`, `\t` and `\\` escapes written inside a single-line step.
///
/// Unknown escapes are kept verbatim so that path expressions such as
/// `$['a\'b']` survive untouched.
#[must_use]
pub fn unescape(value: &str) -> String {
    let mut expanded = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(current) = chars.next() {
        if current != '\\' {
            expanded.push(current);
            continue;
        }
        match chars.next() {
            Some('n') => expanded.push('\n'),
            Some('t') => expanded.push('\t'),
            Some('\\') => expanded.push('\\'),
            Some(other) => {
                expanded.push('\\');
                expanded.push(other);
            }
            None => expanded.push('\\'),
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::{normalize_scalar, unescape, unquote};

    #[test]
    fn unquote_strips_one_matching_layer() {
        assert_eq!(unquote(r#"'{"a":1}'"#), r#"{"a":1}"#);
        assert_eq!(unquote(r#""'nested'""#), "'nested'");
        assert_eq!(unquote("'mismatched\""), "'mismatched\"");
    }

    #[test]
    fn normalize_scalar_trims_inside_and_out() {
        assert_eq!(normalize_scalar("  \" app.conf \"  "), "app.conf");
        assert_eq!(normalize_scalar("\"\""), "");
    }

    #[test]
    fn unescape_expands_newlines_and_tabs() {
        assert_eq!(unescape(r"a\nb\tc"), "a\nb\tc");
        assert_eq!(unescape(r"tail\\"), "tail\\");
    }

    #[test]
    fn unescape_keeps_unknown_escapes() {
        assert_eq!(unescape(r"$['a\'b']"), r"$['a\'b']");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }
}
