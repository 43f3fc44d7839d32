//! Conversion of extracted values into deterministic text bytes.
//!
//! Raw projections of a single `extract` path store scalars as plain text.
//! Numbers are rendered without exponents unless the source literal used one,
//! and lists of strings are joined with a bare comma. Embedded commas are not
//! escaped, so `["a,b"]` and `["a", "b"]` coerce to the same bytes.

use crate::error::{ProjectionError, ProjectionResult};
use crate::value::Value;

/// Render `value` as the bytes stored for a raw projection.
///
/// # Errors
///
/// Returns [`ProjectionError::UnsupportedDatatype`] for nulls, mappings and
/// lists holding anything other than strings.
pub fn coerce_to_bytes(value: &Value) -> ProjectionResult<Vec<u8>> {
    coerce_to_text(value).map(String::into_bytes)
}

fn coerce_to_text(value: &Value) -> ProjectionResult<String> {
    match value {
        Value::Text(text) => Ok(text.clone()),
        Value::Int(number) => Ok(number.to_string()),
        Value::Float(number) => Ok(format_float(*number)),
        Value::Decimal(literal) => coerce_decimal(literal),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Sequence(items) => join_text_items(items),
        Value::Null | Value::Mapping(_) => Err(unsupported(value)),
    }
}

/// Exponent literals pass through untouched; otherwise integers are tried
/// before floats so identifiers never pick up float rounding.
fn coerce_decimal(literal: &str) -> ProjectionResult<String> {
    if literal.contains(['e', 'E']) {
        return Ok(literal.to_owned());
    }
    if let Ok(number) = literal.parse::<i64>() {
        return Ok(number.to_string());
    }
    if let Ok(number) = literal.parse::<u64>() {
        return Ok(number.to_string());
    }
    literal
        .parse::<f64>()
        .map(format_float)
        .map_err(|_| ProjectionError::UnsupportedDatatype {
            found: format!("number {literal}"),
        })
}

/// Shortest round-trippable decimal form, never in scientific notation.
fn format_float(number: f64) -> String {
    format!("{number}")
}

fn join_text_items(items: &[Value]) -> ProjectionResult<String> {
    let texts = items
        .iter()
        .map(|item| match item {
            Value::Text(text) => Ok(text.as_str()),
            other => Err(ProjectionError::UnsupportedDatatype {
                found: format!(
                    "{} in list; only lists of strings can be extracted, try extracting a specific element",
                    other.kind()
                ),
            }),
        })
        .collect::<ProjectionResult<Vec<&str>>>()?;
    Ok(texts.join(","))
}

fn unsupported(value: &Value) -> ProjectionError {
    ProjectionError::UnsupportedDatatype {
        found: value.kind().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    //! Scalar coercion coverage.

    use super::coerce_to_bytes;
    use crate::error::ProjectionError;
    use crate::value::Value;
    use anyhow::Result;
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn text(value: &str) -> Value {
        Value::Text(value.to_owned())
    }

    fn decimal(value: &str) -> Value {
        Value::Decimal(value.to_owned())
    }

    #[rstest]
    #[case(text("hello world"), "hello world")]
    #[case(Value::Int(-17), "-17")]
    #[case(Value::Int(0), "0")]
    #[case(Value::Float(1.5), "1.5")]
    #[case(Value::Float(3.0), "3")]
    #[case(Value::Float(1e21), "1000000000000000000000")]
    #[case(Value::Bool(true), "true")]
    #[case(Value::Bool(false), "false")]
    #[case(decimal("42"), "42")]
    #[case(decimal("-9223372036854775808"), "-9223372036854775808")]
    #[case(decimal("18446744073709551615"), "18446744073709551615")]
    #[case(decimal("0.25"), "0.25")]
    #[case(decimal("1.2e5"), "1.2e5")]
    #[case(decimal("6E-3"), "6E-3")]
    #[case(Value::Sequence(vec![text("a"), text("b"), text("c")]), "a,b,c")]
    #[case(Value::Sequence(Vec::new()), "")]
    fn coerces_scalars(#[case] value: Value, #[case] expected: &str) -> Result<()> {
        let bytes = coerce_to_bytes(&value)?;
        assert_eq!(String::from_utf8(bytes)?, expected);
        Ok(())
    }

    #[rstest]
    fn large_integer_literals_fall_back_to_float_text() -> Result<()> {
        let bytes = coerce_to_bytes(&decimal("123456789012345678901234567890"))?;
        assert_eq!(String::from_utf8(bytes)?, "123456789012345680000000000000");
        Ok(())
    }

    #[rstest]
    fn list_join_does_not_escape_commas() -> Result<()> {
        let joined = coerce_to_bytes(&Value::Sequence(vec![text("a,b")]))?;
        let split = coerce_to_bytes(&Value::Sequence(vec![text("a"), text("b")]))?;
        assert_eq!(joined, split);
        Ok(())
    }

    #[rstest]
    #[case(Value::Null)]
    #[case(Value::Mapping(BTreeMap::new()))]
    #[case(Value::Sequence(vec![text("a"), Value::Int(1)]))]
    #[case(Value::Sequence(vec![Value::Sequence(Vec::new())]))]
    fn rejects_unsupported_datatypes(#[case] value: Value) {
        let err = coerce_to_bytes(&value).expect_err("coercion should fail");
        assert!(
            matches!(err, ProjectionError::UnsupportedDatatype { .. }),
            "unexpected error: {err:?}"
        );
    }
}
