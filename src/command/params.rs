//! Typed parameter schemas for device commands
//!
//! The conversation service sends command parameters as a JSON object
//! of strings. Each command declares its schema up front; dispatch
//! parses the raw object against it before the handler ever runs, so
//! handlers only see validated values.

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Raw parameters did not match the declared schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("parameters must be a JSON object")]
    NotAnObject,
    #[error("missing parameter '{0}'")]
    Missing(String),
    #[error("parameter '{0}' must be a string")]
    NotAString(String),
    #[error("parameter '{name}' must be one of {expected:?}, got '{got}'")]
    UnknownChoice {
        name: String,
        expected: &'static [&'static str],
        got: String,
    },
    #[error("parameter '{name}' is not an integer: '{got}'")]
    NotAnInteger { name: String, got: String },
    #[error("parameter '{name}' must be non-negative, got {got}")]
    Negative { name: String, got: i64 },
    #[error("parameter '{name}' is out of range: {got}")]
    OutOfRange { name: String, got: i64 },
    #[error("unexpected parameter '{0}'")]
    Unexpected(String),
}

/// Kind of a single declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamKind {
    /// One of a fixed set of keywords, sent verbatim by the service.
    Choice(&'static [&'static str]),
    /// Non-negative integer encoded as a decimal string.
    UInt,
}

#[derive(Debug, Clone)]
struct ParamSpec {
    name: &'static str,
    kind: ParamKind,
}

/// Declared parameters of one command
#[derive(Debug, Clone, Default)]
pub struct ParamSchema {
    specs: Vec<ParamSpec>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a keyword parameter.
    pub fn choice(mut self, name: &'static str, options: &'static [&'static str]) -> Self {
        self.specs.push(ParamSpec {
            name,
            kind: ParamKind::Choice(options),
        });
        self
    }

    /// Declare a non-negative integer parameter.
    pub fn uint(mut self, name: &'static str) -> Self {
        self.specs.push(ParamSpec {
            name,
            kind: ParamKind::UInt,
        });
        self
    }

    /// Parse a raw JSON object of strings against this schema.
    ///
    /// Strict on both sides: every declared parameter must be present,
    /// and parameters outside the schema are rejected rather than
    /// ignored. An extra key means device and service registration
    /// have drifted apart, which should surface early.
    pub fn parse(&self, raw: &Value) -> Result<ParamValues, ParameterError> {
        let object = raw.as_object().ok_or(ParameterError::NotAnObject)?;

        for key in object.keys() {
            if !self.specs.iter().any(|spec| spec.name == key.as_str()) {
                return Err(ParameterError::Unexpected(key.clone()));
            }
        }

        let mut values = HashMap::new();
        for spec in &self.specs {
            let raw_value = object
                .get(spec.name)
                .ok_or_else(|| ParameterError::Missing(spec.name.into()))?;
            let text = raw_value
                .as_str()
                .ok_or_else(|| ParameterError::NotAString(spec.name.into()))?;

            let value = match spec.kind {
                ParamKind::Choice(options) => {
                    if !options.contains(&text) {
                        return Err(ParameterError::UnknownChoice {
                            name: spec.name.into(),
                            expected: options,
                            got: text.into(),
                        });
                    }
                    ParamValue::Choice(text.to_owned())
                }
                ParamKind::UInt => {
                    let n: i64 =
                        text.trim()
                            .parse()
                            .map_err(|_| ParameterError::NotAnInteger {
                                name: spec.name.into(),
                                got: text.into(),
                            })?;
                    if n < 0 {
                        return Err(ParameterError::Negative {
                            name: spec.name.into(),
                            got: n,
                        });
                    }
                    let n = u32::try_from(n).map_err(|_| ParameterError::OutOfRange {
                        name: spec.name.into(),
                        got: n,
                    })?;
                    ParamValue::UInt(n)
                }
            };
            values.insert(spec.name.to_owned(), value);
        }

        Ok(ParamValues { values })
    }
}

/// A single validated parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Choice(String),
    UInt(u32),
}

/// Parameters parsed and validated against a schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamValues {
    values: HashMap<String, ParamValue>,
}

impl ParamValues {
    /// Keyword value of a declared choice parameter.
    pub fn choice(&self, name: &str) -> anyhow::Result<&str> {
        match self.values.get(name) {
            Some(ParamValue::Choice(keyword)) => Ok(keyword),
            other => anyhow::bail!("parameter '{}' missing or not a keyword: {:?}", name, other),
        }
    }

    /// Value of a declared non-negative integer parameter.
    pub fn uint(&self, name: &str) -> anyhow::Result<u32> {
        match self.values.get(name) {
            Some(ParamValue::UInt(n)) => Ok(*n),
            other => anyhow::bail!("parameter '{}' missing or not an integer: {:?}", name, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> ParamSchema {
        ParamSchema::new()
            .choice("speed", &["SLOWLY", "NORMALLY", "QUICKLY"])
            .uint("number")
    }

    #[test]
    fn test_parse_valid_object() {
        let values = schema()
            .parse(&json!({"speed": "QUICKLY", "number": "3"}))
            .expect("valid params");

        assert_eq!(values.choice("speed").unwrap(), "QUICKLY");
        assert_eq!(values.uint("number").unwrap(), 3);
    }

    #[test]
    fn test_integer_tolerates_surrounding_whitespace() {
        let values = schema()
            .parse(&json!({"speed": "NORMALLY", "number": " 2 "}))
            .expect("valid params");
        assert_eq!(values.uint("number").unwrap(), 2);
    }

    #[test]
    fn test_missing_parameter_rejected() {
        let err = schema().parse(&json!({"speed": "SLOWLY"})).unwrap_err();
        assert_eq!(err, ParameterError::Missing("number".into()));
    }

    #[test]
    fn test_unexpected_parameter_rejected() {
        let err = schema()
            .parse(&json!({"speed": "SLOWLY", "number": "1", "color": "RED"}))
            .unwrap_err();
        assert_eq!(err, ParameterError::Unexpected("color".into()));
    }

    #[test]
    fn test_non_string_value_rejected() {
        let err = schema()
            .parse(&json!({"speed": "SLOWLY", "number": 3}))
            .unwrap_err();
        assert_eq!(err, ParameterError::NotAString("number".into()));
    }

    #[test]
    fn test_unknown_keyword_rejected() {
        let err = schema()
            .parse(&json!({"speed": "BACKWARDS", "number": "1"}))
            .unwrap_err();
        assert!(matches!(err, ParameterError::UnknownChoice { ref name, .. } if name == "speed"));
    }

    #[test]
    fn test_non_numeric_count_rejected() {
        let err = schema()
            .parse(&json!({"speed": "SLOWLY", "number": "abc"}))
            .unwrap_err();
        assert!(matches!(err, ParameterError::NotAnInteger { ref name, .. } if name == "number"));
    }

    #[test]
    fn test_negative_count_rejected() {
        let err = schema()
            .parse(&json!({"speed": "SLOWLY", "number": "-1"}))
            .unwrap_err();
        assert_eq!(
            err,
            ParameterError::Negative {
                name: "number".into(),
                got: -1
            }
        );
    }

    #[test]
    fn test_oversized_count_rejected() {
        let err = schema()
            .parse(&json!({"speed": "SLOWLY", "number": "4294967296"}))
            .unwrap_err();
        assert!(matches!(err, ParameterError::OutOfRange { ref name, .. } if name == "number"));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = schema().parse(&json!("QUICKLY")).unwrap_err();
        assert_eq!(err, ParameterError::NotAnObject);
    }

    #[test]
    fn test_zero_count_is_valid() {
        let values = schema()
            .parse(&json!({"speed": "QUICKLY", "number": "0"}))
            .expect("zero is in range");
        assert_eq!(values.uint("number").unwrap(), 0);
    }
}
