//! # Scalars — Underlying Values of Enum Cases
//!
//! Every enum case is backed by exactly one scalar: an integer, a string, a
//! float or a boolean. A kind fixes one [`ScalarType`] for all of its cases.
//!
//! ## Strict typing
//!
//! [`Scalar::from_json`] classifies a raw JSON value without any coercion:
//! `1` is an integer, `1.0` and `2.5` are floats, `"1"` is a string. A raw
//! value only matches a case when both the type and the value agree.
//!
//! The only sanctioned conversion between types is [`Scalar::cast`], used
//! when a field explicitly declares the type its raw values must be read as
//! (text-only formats such as XML deliver every leaf as a string).

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::str::FromStr;
use thiserror::Error;

/// The underlying type shared by all cases of one enum kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    /// Signed 64-bit integer. Multi-enum kinds are always integer-backed.
    Integer,
    /// UTF-8 string.
    String,
    /// Finite 64-bit float.
    Float,
    /// Boolean.
    Boolean,
}

impl ScalarType {
    /// Returns every scalar type in canonical order.
    pub fn all_types() -> &'static [ScalarType] {
        &[Self::Integer, Self::String, Self::Float, Self::Boolean]
    }

    /// Returns the lowercase identifier used in configuration and type expressions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::String => "string",
            Self::Float => "float",
            Self::Boolean => "boolean",
        }
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An identifier that does not name a [`ScalarType`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown scalar type {0:?} (expected integer, string, float or boolean)")]
pub struct UnknownScalarType(pub String);

impl FromStr for ScalarType {
    type Err = UnknownScalarType;

    /// Parse a scalar type identifier. `int` and `bool` are accepted as aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "integer" | "int" => Ok(Self::Integer),
            "string" => Ok(Self::String),
            "float" => Ok(Self::Float),
            "boolean" | "bool" => Ok(Self::Boolean),
            other => Err(UnknownScalarType(other.to_string())),
        }
    }
}

/// The underlying value of an enum case.
///
/// Deserializes untagged, so catalog files can write case values as plain
/// YAML/JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Integer value.
    Integer(i64),
    /// String value.
    String(String),
    /// Float value.
    Float(f64),
    /// Boolean value.
    Boolean(bool),
}

impl Scalar {
    /// The type of this value.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Self::Integer(_) => ScalarType::Integer,
            Self::String(_) => ScalarType::String,
            Self::Float(_) => ScalarType::Float,
            Self::Boolean(_) => ScalarType::Boolean,
        }
    }

    /// Classify a raw JSON value without coercion.
    ///
    /// Returns `None` for `null`, arrays, objects, and unsigned integers
    /// beyond `i64::MAX`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Boolean(*b)),
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Integer(i))
                } else if n.is_u64() {
                    None
                } else {
                    n.as_f64().map(Self::Float)
                }
            }
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Render as a JSON value. Non-finite floats render as `null`; they can
    /// never be case values.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Integer(i) => Value::from(*i),
            Self::String(s) => Value::String(s.clone()),
            Self::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Boolean(b) => Value::Bool(*b),
        }
    }

    /// Read a raw JSON value as `target`, converting across types where the
    /// conversion is lossless and unambiguous.
    ///
    /// Floats cast to string in plain decimal at any magnitude, never in
    /// exponent form.
    ///
    /// Returns `None` when the value cannot be read as `target`; callers
    /// report the original raw value in that case.
    pub fn cast(value: &Value, target: ScalarType) -> Option<Self> {
        let scalar = Self::from_json(value)?;
        match (target, scalar) {
            (ScalarType::String, Self::String(s)) => Some(Self::String(s)),
            (ScalarType::String, Self::Integer(i)) => Some(Self::String(i.to_string())),
            (ScalarType::String, Self::Float(f)) => Some(Self::String(f.to_string())),
            (ScalarType::String, Self::Boolean(b)) => Some(Self::String(b.to_string())),

            (ScalarType::Integer, Self::Integer(i)) => Some(Self::Integer(i)),
            (ScalarType::Integer, Self::String(s)) => s.trim().parse().ok().map(Self::Integer),

            (ScalarType::Float, Self::Float(f)) => Some(Self::Float(f)),
            (ScalarType::Float, Self::Integer(i)) => Some(Self::Float(i as f64)),
            (ScalarType::Float, Self::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Self::Float),

            (ScalarType::Boolean, Self::Boolean(b)) => Some(Self::Boolean(b)),
            (ScalarType::Boolean, Self::String(s)) => match s.trim() {
                "true" | "1" => Some(Self::Boolean(true)),
                "false" | "0" => Some(Self::Boolean(false)),
                _ => None,
            },

            _ => None,
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_type_roundtrip() {
        for ty in ScalarType::all_types() {
            let parsed: ScalarType = ty.as_str().parse().unwrap();
            assert_eq!(*ty, parsed);
        }
    }

    #[test]
    fn test_scalar_type_aliases() {
        assert_eq!("int".parse::<ScalarType>().unwrap(), ScalarType::Integer);
        assert_eq!("bool".parse::<ScalarType>().unwrap(), ScalarType::Boolean);
        assert!("Integer".parse::<ScalarType>().is_err());
        assert!("".parse::<ScalarType>().is_err());
    }

    #[test]
    fn test_from_json_is_strict() {
        assert_eq!(Scalar::from_json(&json!(1)), Some(Scalar::Integer(1)));
        assert_eq!(Scalar::from_json(&json!(2.5)), Some(Scalar::Float(2.5)));
        assert_eq!(Scalar::from_json(&json!(1.0)), Some(Scalar::Float(1.0)));
        assert_eq!(Scalar::from_json(&json!("1")), Some(Scalar::String("1".into())));
        assert_eq!(Scalar::from_json(&json!(true)), Some(Scalar::Boolean(true)));
    }

    #[test]
    fn test_from_json_rejects_non_scalars() {
        assert_eq!(Scalar::from_json(&json!(null)), None);
        assert_eq!(Scalar::from_json(&json!([1, 2, 3])), None);
        assert_eq!(Scalar::from_json(&json!({"foo": "bar"})), None);
        assert_eq!(Scalar::from_json(&json!(u64::MAX)), None);
    }

    #[test]
    fn test_to_json() {
        assert_eq!(Scalar::Integer(1).to_json(), json!(1));
        assert_eq!(Scalar::from("foo").to_json(), json!("foo"));
        assert_eq!(Scalar::Float(2.5).to_json(), json!(2.5));
        assert_eq!(Scalar::Boolean(true).to_json(), json!(true));
        assert_eq!(Scalar::Float(f64::NAN).to_json(), Value::Null);
    }

    #[test]
    fn test_cast_to_string() {
        assert_eq!(Scalar::cast(&json!(1), ScalarType::String), Some(Scalar::from("1")));
        assert_eq!(Scalar::cast(&json!(2.5), ScalarType::String), Some(Scalar::from("2.5")));
        assert_eq!(Scalar::cast(&json!(false), ScalarType::String), Some(Scalar::from("false")));
        assert_eq!(Scalar::cast(&json!("admin"), ScalarType::String), Some(Scalar::from("admin")));
    }

    #[test]
    fn test_cast_float_to_string_is_plain_decimal() {
        assert_eq!(
            Scalar::cast(&json!(1e21), ScalarType::String),
            Some(Scalar::from("1000000000000000000000"))
        );
        assert_eq!(Scalar::cast(&json!(1e-7), ScalarType::String), Some(Scalar::from("0.0000001")));
        assert_eq!(Scalar::cast(&json!(-0.5), ScalarType::String), Some(Scalar::from("-0.5")));
    }

    #[test]
    fn test_cast_from_text() {
        assert_eq!(Scalar::cast(&json!("42"), ScalarType::Integer), Some(Scalar::Integer(42)));
        assert_eq!(Scalar::cast(&json!("2.5"), ScalarType::Float), Some(Scalar::Float(2.5)));
        assert_eq!(Scalar::cast(&json!(3), ScalarType::Float), Some(Scalar::Float(3.0)));
        assert_eq!(Scalar::cast(&json!("1"), ScalarType::Boolean), Some(Scalar::Boolean(true)));
        assert_eq!(Scalar::cast(&json!("false"), ScalarType::Boolean), Some(Scalar::Boolean(false)));
    }

    #[test]
    fn test_cast_failures() {
        assert_eq!(Scalar::cast(&json!("foo"), ScalarType::Integer), None);
        assert_eq!(Scalar::cast(&json!(2.5), ScalarType::Integer), None);
        assert_eq!(Scalar::cast(&json!("NaN"), ScalarType::Float), None);
        assert_eq!(Scalar::cast(&json!("yes"), ScalarType::Boolean), None);
        assert_eq!(Scalar::cast(&json!([1]), ScalarType::String), None);
        assert_eq!(Scalar::cast(&json!(null), ScalarType::String), None);
    }

    #[test]
    fn test_untagged_deserialize() {
        let values: Vec<Scalar> = serde_json::from_str(r#"[1, "foo", 2.5, true]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Scalar::Integer(1),
                Scalar::from("foo"),
                Scalar::Float(2.5),
                Scalar::Boolean(true)
            ]
        );
    }

    #[test]
    fn test_display_is_json() {
        assert_eq!(Scalar::from("admin").to_string(), "\"admin\"");
        assert_eq!(Scalar::Integer(3).to_string(), "3");
    }
}
