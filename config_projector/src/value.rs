//! Dynamically typed tree decoded from JSON and YAML sources.
//!
//! JSON documents keep every number as the literal text found in the source
//! ([`Value::Decimal`]) so that large identifiers survive projection intact.
//! YAML documents carry typed integers and floats instead.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value as JsonValue;

/// A node of a decoded source document.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null or an empty document.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Signed integer scalar.
    Int(i64),
    /// Floating point scalar.
    Float(f64),
    /// Number preserved as its literal source text.
    Decimal(String),
    /// String scalar.
    Text(String),
    /// Ordered list of nodes.
    Sequence(Vec<Value>),
    /// Mapping with string keys, kept sorted.
    Mapping(BTreeMap<String, Value>),
}

impl Value {
    /// Human-readable name of the node kind, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Decimal(_) => "number",
            Self::Text(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }

    /// Convert into a JSON value, emitting decimal literals verbatim.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(flag) => JsonValue::Bool(*flag),
            Self::Int(number) => JsonValue::from(*number),
            Self::Float(number) => {
                serde_json::Number::from_f64(*number).map_or(JsonValue::Null, JsonValue::Number)
            }
            Self::Decimal(literal) => literal
                .parse::<serde_json::Number>()
                .map_or_else(|_| JsonValue::String(literal.clone()), JsonValue::Number),
            Self::Text(text) => JsonValue::String(text.clone()),
            Self::Sequence(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            Self::Mapping(entries) => JsonValue::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(flag) => Self::Bool(flag),
            // With `arbitrary_precision` the display form is the source literal.
            JsonValue::Number(number) => Self::Decimal(number.to_string()),
            JsonValue::String(text) => Self::Text(text),
            JsonValue::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            JsonValue::Object(entries) => Self::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Serialises through the target format's own scalar types.
///
/// Integer literals up to 128 bits are emitted exactly and other decimal
/// literals become floats, so formats without literal-number support (YAML)
/// still see numbers. Use [`Value::to_json`] when the literal text must be
/// preserved.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(flag) => serializer.serialize_bool(*flag),
            Self::Int(number) => serializer.serialize_i64(*number),
            Self::Float(number) => serializer.serialize_f64(*number),
            Self::Decimal(literal) => serialize_decimal(literal, serializer),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

fn serialize_decimal<S: Serializer>(literal: &str, serializer: S) -> Result<S::Ok, S::Error> {
    if let Ok(number) = literal.parse::<i64>() {
        return serializer.serialize_i64(number);
    }
    if let Ok(number) = literal.parse::<u64>() {
        return serializer.serialize_u64(number);
    }
    if let Ok(number) = literal.parse::<i128>() {
        return serializer.serialize_i128(number);
    }
    if let Ok(number) = literal.parse::<u128>() {
        return serializer.serialize_u128(number);
    }
    match literal.parse::<f64>() {
        Ok(number) => serializer.serialize_f64(number),
        Err(_) => serializer.serialize_str(literal),
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any YAML or JSON value")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Value, E> {
        Ok(Value::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Value, E> {
        Ok(Value::Int(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Value, E> {
        Ok(i64::try_from(value).map_or_else(|_| Value::Decimal(value.to_string()), Value::Int))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Value, E> {
        Ok(Value::Float(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Value, E> {
        Ok(Value::Text(value.to_owned()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Value, E> {
        Ok(Value::Text(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<Value, Value>()? {
            entries.insert(mapping_key(key)?, value);
        }
        Ok(Value::Mapping(entries))
    }
}

/// Render a scalar mapping key as text; structured keys are rejected.
fn mapping_key<E: de::Error>(key: Value) -> Result<String, E> {
    match key {
        Value::Text(text) | Value::Decimal(text) => Ok(text),
        Value::Int(number) => Ok(number.to_string()),
        Value::Float(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null => Ok(String::from("null")),
        other @ (Value::Sequence(_) | Value::Mapping(_)) => Err(E::custom(format!(
            "mapping keys must be scalars, found {}",
            other.kind()
        ))),
    }
}

#[cfg(test)]
mod tests {
    //! Conversions between the decoded tree and serde formats.

    use super::Value;
    use anyhow::Result;
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn yaml(text: &str) -> Result<Value> {
        Ok(crate::yaml::from_str(text)?)
    }

    #[rstest]
    fn json_numbers_keep_their_literal_text() -> Result<()> {
        let decoded: serde_json::Value =
            serde_json::from_str(r#"{"id": 12345678901234567890123, "ratio": 2.5}"#)?;
        let Value::Mapping(entries) = Value::from(decoded) else {
            anyhow::bail!("expected a mapping");
        };
        assert_eq!(
            entries.get("id"),
            Some(&Value::Decimal(String::from("12345678901234567890123")))
        );
        assert_eq!(entries.get("ratio"), Some(&Value::Decimal(String::from("2.5"))));
        Ok(())
    }

    #[rstest]
    #[case("12345678901234567890123", "id: 12345678901234567890123\n")]
    #[case("-12345678901234567890123", "id: -12345678901234567890123\n")]
    #[case("42", "id: 42\n")]
    #[case("2.5", "id: 2.5\n")]
    fn yaml_output_keeps_wide_integers(
        #[case] literal: &str,
        #[case] expected: &str,
    ) -> Result<()> {
        let mut entries = BTreeMap::new();
        entries.insert(String::from("id"), Value::Decimal(literal.to_owned()));
        assert_eq!(serde_yaml::to_string(&Value::Mapping(entries))?, expected);
        Ok(())
    }

    #[rstest]
    fn yaml_scalars_are_typed() -> Result<()> {
        let decoded = yaml("count: 3\nratio: 0.5\nenabled: true\nname: web\nnothing: ~\n")?;
        let mut expected = BTreeMap::new();
        expected.insert(String::from("count"), Value::Int(3));
        expected.insert(String::from("ratio"), Value::Float(0.5));
        expected.insert(String::from("enabled"), Value::Bool(true));
        expected.insert(String::from("name"), Value::Text(String::from("web")));
        expected.insert(String::from("nothing"), Value::Null);
        assert_eq!(decoded, Value::Mapping(expected));
        Ok(())
    }

    #[rstest]
    fn yaml_yes_remains_text() -> Result<()> {
        let decoded = yaml("answer: yes")?;
        let Value::Mapping(entries) = decoded else {
            anyhow::bail!("expected a mapping");
        };
        assert_eq!(entries.get("answer"), Some(&Value::Text(String::from("yes"))));
        Ok(())
    }

    #[rstest]
    fn yaml_scalar_keys_become_text() -> Result<()> {
        let decoded = yaml("1: one\ntrue: yes-really\n")?;
        let Value::Mapping(entries) = decoded else {
            anyhow::bail!("expected a mapping");
        };
        assert!(entries.contains_key("1"));
        assert!(entries.contains_key("true"));
        Ok(())
    }

    #[rstest]
    fn to_json_emits_decimal_literals_verbatim() -> Result<()> {
        let value = Value::Decimal(String::from("98765432109876543210"));
        assert_eq!(serde_json::to_string(&value.to_json())?, "98765432109876543210");
        Ok(())
    }

    #[rstest]
    #[case(Value::Decimal(String::from("42")), "42\n")]
    #[case(Value::Decimal(String::from("2.5")), "2.5\n")]
    #[case(Value::Text(String::from("plain")), "plain\n")]
    fn yaml_serialisation_uses_native_scalars(
        #[case] value: Value,
        #[case] expected: &str,
    ) -> Result<()> {
        assert_eq!(serde_yaml::to_string(&value)?, expected);
        Ok(())
    }
}
