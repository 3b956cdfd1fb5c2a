//! Schema-checked loading of entity JSON
//!
//! Entity files come from users and from other tools, so every field is
//! checked by name before it reaches the model. Violations carry the JSON
//! path of the offending field.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;

use super::entities::*;

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    #[error("Schema violation: missing required field `{path}`")]
    MissingField { path: String },

    #[error("Schema violation: `{path}` must be {expected}")]
    InvalidType { path: String, expected: &'static str },

    #[error("Schema violation: `{path}` {message}")]
    InvalidValue { path: String, message: String },
}

impl ParsedEntities {
    /// Parse entity JSON text, checking it against the entity schema.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| SchemaError::MalformedJson(e.to_string()))?;
        Self::from_json_value(&value)
    }

    /// Check an already-parsed JSON value against the entity schema.
    pub fn from_json_value(value: &Value) -> Result<Self, SchemaError> {
        let obj = as_object(value, "$")?;

        let title = match obj.get("title") {
            None | Some(Value::Null) => DEFAULT_TITLE.to_string(),
            Some(v) => as_string(v, "title")?,
        };

        let rails = list_of(obj, "rails", parse_rail)?;
        let oscillators = list_of(obj, "oscillators", parse_oscillator)?;
        let functional_tests = list_of(obj, "functional_tests", parse_functional_test)?;

        Ok(ParsedEntities {
            title,
            rails,
            oscillators,
            functional_tests,
        })
    }
}

impl<'de> Deserialize<'de> for ParsedEntities {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        ParsedEntities::from_json_value(&value).map_err(serde::de::Error::custom)
    }
}

fn parse_rail(value: &Value, path: &str) -> Result<PowerRail, SchemaError> {
    let obj = as_object(value, path)?;
    let name = required_string(obj, path, "name")?;
    let voltage = required_number(obj, path, "voltage")?;
    if voltage <= 0.0 {
        return Err(SchemaError::InvalidValue {
            path: format!("{}.voltage", path),
            message: format!("must be greater than zero (got {})", voltage),
        });
    }
    let tolerance_mv = optional_count(obj, path, "tolerance_mv")?.unwrap_or(DEFAULT_RAIL_TOLERANCE_MV);
    Ok(PowerRail {
        name,
        voltage,
        tolerance_mv,
    })
}

fn parse_oscillator(value: &Value, path: &str) -> Result<Oscillator, SchemaError> {
    let obj = as_object(value, path)?;
    let reference = required_string(obj, path, "ref")?;
    let frequency_hz = required_number(obj, path, "frequency_hz")?;
    let tolerance_hz = optional_count(obj, path, "tolerance_hz")?.unwrap_or(DEFAULT_OSC_TOLERANCE_HZ);
    Ok(Oscillator {
        reference,
        frequency_hz,
        tolerance_hz,
    })
}

fn parse_functional_test(value: &Value, path: &str) -> Result<FunctionalTest, SchemaError> {
    let obj = as_object(value, path)?;
    Ok(FunctionalTest {
        name: required_string(obj, path, "name")?,
        command: optional_string(obj, path, "command")?,
        expected: optional_string(obj, path, "expected")?,
    })
}

fn list_of<T>(
    obj: &Map<String, Value>,
    key: &str,
    parse: fn(&Value, &str) -> Result<T, SchemaError>,
) -> Result<Vec<T>, SchemaError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| parse(item, &format!("{}[{}]", key, i)))
            .collect(),
        Some(_) => Err(SchemaError::InvalidType {
            path: key.to_string(),
            expected: "an array",
        }),
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SchemaError> {
    value.as_object().ok_or_else(|| SchemaError::InvalidType {
        path: path.to_string(),
        expected: "an object",
    })
}

fn as_string(value: &Value, path: &str) -> Result<String, SchemaError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SchemaError::InvalidType {
            path: path.to_string(),
            expected: "a string",
        })
}

fn required_string(obj: &Map<String, Value>, path: &str, key: &str) -> Result<String, SchemaError> {
    let field = format!("{}.{}", path, key);
    match obj.get(key) {
        None | Some(Value::Null) => Err(SchemaError::MissingField { path: field }),
        Some(v) => as_string(v, &field),
    }
}

fn optional_string(
    obj: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<Option<String>, SchemaError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => as_string(v, &format!("{}.{}", path, key)).map(Some),
    }
}

fn required_number(obj: &Map<String, Value>, path: &str, key: &str) -> Result<f64, SchemaError> {
    let field = format!("{}.{}", path, key);
    match obj.get(key) {
        None | Some(Value::Null) => Err(SchemaError::MissingField { path: field }),
        Some(v) => v.as_f64().ok_or(SchemaError::InvalidType {
            path: field,
            expected: "a number",
        }),
    }
}

/// Non-negative integer field. Integral floats (`100.0`) are accepted.
fn optional_count(
    obj: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<Option<u32>, SchemaError> {
    let field = format!("{}.{}", path, key);
    let value = match obj.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => v,
    };
    let n = value.as_f64().ok_or_else(|| SchemaError::InvalidType {
        path: field.clone(),
        expected: "an integer",
    })?;
    if n.fract() != 0.0 {
        return Err(SchemaError::InvalidType {
            path: field,
            expected: "an integer",
        });
    }
    if n < 0.0 || n > u32::MAX as f64 {
        return Err(SchemaError::InvalidValue {
            path: field,
            message: format!("is out of range (got {})", n),
        });
    }
    Ok(Some(n as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMOKE: &str = r#"{"title":"SmokeTest","rails":[{"name":"+5V","voltage":5.0,"tolerance_mv":100}],"oscillators":[{"ref":"Y1","frequency_hz":16000000,"tolerance_hz":100000}],"functional_tests":[{"name":"Ping","command":"bit.ping","expected":"PASS"}]}"#;

    #[test]
    fn test_parse_smoke_entities() {
        let ent = ParsedEntities::from_json_str(SMOKE).unwrap();
        assert_eq!(ent.title, "SmokeTest");
        assert_eq!(ent.rails.len(), 1);
        assert_eq!(ent.oscillators[0].reference, "Y1");
        assert_eq!(ent.oscillators[0].frequency_hz, 16_000_000.0);
        assert_eq!(ent.functional_tests[0].command.as_deref(), Some("bit.ping"));
    }

    #[test]
    fn test_defaults_applied() {
        let ent = ParsedEntities::from_json_str(
            r#"{"rails":[{"name":"VDD","voltage":1.8}],"oscillators":[{"ref":"X1","frequency_hz":8e6}],"functional_tests":[{"name":"Blink"}]}"#,
        )
        .unwrap();
        assert_eq!(ent.title, DEFAULT_TITLE);
        assert_eq!(ent.rails[0].tolerance_mv, 100);
        assert_eq!(ent.oscillators[0].tolerance_hz, 100_000);
        assert!(ent.functional_tests[0].command.is_none());
        assert!(ent.functional_tests[0].expected.is_none());
    }

    #[test]
    fn test_empty_object_is_valid() {
        let ent = ParsedEntities::from_json_str("{}").unwrap();
        assert!(ent.rails.is_empty());
        assert!(ent.oscillators.is_empty());
        assert!(ent.functional_tests.is_empty());
    }

    #[test]
    fn test_round_trip_preserves_shape() {
        let ent = ParsedEntities::from_json_str(SMOKE).unwrap();
        let again = ParsedEntities::from_json_str(&ent.to_json_pretty()).unwrap();
        assert_eq!(ent, again);

        let original: Value = serde_json::from_str(SMOKE).unwrap();
        let emitted: Value = serde_json::from_str(&ent.to_json()).unwrap();
        assert_eq!(original["rails"], emitted["rails"]);
        assert_eq!(
            original["functional_tests"],
            emitted["functional_tests"]
        );
    }

    #[test]
    fn test_missing_rail_name() {
        let err = ParsedEntities::from_json_str(r#"{"rails":[{"voltage":5.0}]}"#).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingField {
                path: "rails[0].name".to_string()
            }
        );
    }

    #[test]
    fn test_wrong_types_rejected() {
        let err = ParsedEntities::from_json_str(r#"{"rails":{}}"#).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidType { .. }));

        let err =
            ParsedEntities::from_json_str(r#"{"rails":[{"name":"+5V","voltage":"5"}]}"#).unwrap_err();
        assert!(err.to_string().contains("rails[0].voltage"));

        let err = ParsedEntities::from_json_str(
            r#"{"rails":[{"name":"+5V","voltage":5.0,"tolerance_mv":0.5}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("integer"));
    }

    #[test]
    fn test_non_positive_voltage_rejected() {
        let err = ParsedEntities::from_json_str(r#"{"rails":[{"name":"X","voltage":0}]}"#).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidValue { .. }));
    }

    #[test]
    fn test_serde_deserialize_enforces_schema() {
        let err = serde_json::from_str::<ParsedEntities>(r#"{"rails":[{"name":"X","voltage":-3.0}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("rails[0].voltage"));

        let ent: ParsedEntities = serde_json::from_str(SMOKE).unwrap();
        assert_eq!(ent, ParsedEntities::from_json_str(SMOKE).unwrap());
    }

    #[test]
    fn test_malformed_json() {
        let err = ParsedEntities::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, SchemaError::MalformedJson(_)));
    }
}
