//! # Handler Errors
//!
//! What the host serializer sees when an enum field cannot be converted.
//!
//! ## Two layers
//!
//! Value-level failures ([`InvalidValue`]) are wrapped with the position of
//! the offending field: [`HandlerError::DeserializationInvalidValue`] carries
//! the dotted field path of the input document and
//! [`HandlerError::SerializationInvalidValue`] carries the `Root::$property`
//! chain of the object graph. The cause stays inspectable through
//! [`HandlerError::cause`] and `std::error::Error::source`.
//!
//! Configuration failures (unknown kind, missing kind name, a case-array
//! field on a plain kind, a multi kind without association) surface
//! unwrapped; they describe the metadata, not the value.

use enumwire_core::{EnumError, KindDefinitionError, KindId};
use serde_json::Value;
use thiserror::Error;

use crate::shape::Strategy;

/// A failed enum field conversion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HandlerError {
    /// The raw input value could not be converted.
    #[error("invalid enum value at {field_path}: {source}")]
    DeserializationInvalidValue {
        /// Dotted serialized-name path from the document root.
        field_path: String,
        /// What was wrong with the value.
        source: InvalidValue,
    },

    /// The in-memory value could not be converted.
    #[error("invalid enum value at {property_path}: {source}")]
    SerializationInvalidValue {
        /// `Root::$a::$b` chain from the root object.
        property_path: String,
        /// What was wrong with the value.
        source: InvalidValue,
    },

    /// The declared kind is not a registered enum kind.
    #[error("{0} is not a registered enum kind")]
    NotEnum(String),

    /// The field is declared enum-valued but names no kind.
    #[error("enum field {0} does not name its enum kind")]
    MissingEnumName(String),

    /// A case-array field was declared on an ordinary kind.
    #[error("{0} is not a multi enum")]
    NotMultiEnum(KindId),

    /// A case-array field was declared on a multi kind without association.
    #[error("no single enum specified for multi enum {0}")]
    NoSingleEnumSpecified(KindId),

    /// Any other metadata failure, such as a malformed association.
    #[error(transparent)]
    Enum(EnumError),
}

impl HandlerError {
    /// Wrap a value-level failure found while deserializing.
    pub fn deserialization(field_path: impl Into<String>, source: impl Into<InvalidValue>) -> Self {
        Self::DeserializationInvalidValue {
            field_path: field_path.into(),
            source: source.into(),
        }
    }

    /// Wrap a value-level failure found while serializing.
    pub fn serialization(property_path: impl Into<String>, source: impl Into<InvalidValue>) -> Self {
        Self::SerializationInvalidValue {
            property_path: property_path.into(),
            source: source.into(),
        }
    }

    /// Field path of a wrapped deserialization failure.
    pub fn field_path(&self) -> Option<&str> {
        match self {
            Self::DeserializationInvalidValue { field_path, .. } => Some(field_path),
            _ => None,
        }
    }

    /// Property path of a wrapped serialization failure.
    pub fn property_path(&self) -> Option<&str> {
        match self {
            Self::SerializationInvalidValue { property_path, .. } => Some(property_path),
            _ => None,
        }
    }

    /// The wrapped value-level cause.
    pub fn cause(&self) -> Option<&InvalidValue> {
        match self {
            Self::DeserializationInvalidValue { source, .. }
            | Self::SerializationInvalidValue { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<EnumError> for HandlerError {
    /// Configuration-level enum errors keep their own variant; everything
    /// else is carried as [`HandlerError::Enum`].
    fn from(err: EnumError) -> Self {
        match err {
            EnumError::NotEnum(id) => Self::NotEnum(id),
            EnumError::NotMultiEnum(id) => Self::NotMultiEnum(id),
            EnumError::NoSingleEnumSpecified(id) => Self::NoSingleEnumSpecified(id),
            other => Self::Enum(other),
        }
    }
}

/// Why a value did not fit its field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidValue {
    /// Lookup or bitmask decoding failed, typically
    /// [`EnumError::InvalidEnumValue`].
    #[error(transparent)]
    Enum(#[from] EnumError),

    /// An array-shaped field received something that is not an array.
    #[error("expected an array, got {value}")]
    NotIterableValue {
        /// The raw value as supplied.
        value: Value,
    },

    /// The value belongs to a different kind than the field is mapped to.
    #[error("field is mapped to {mapped}, got a value of {value_kind}")]
    MappedClassMismatch {
        /// The kind the field is mapped to.
        mapped: KindId,
        /// The kind of the supplied value.
        value_kind: KindId,
    },

    /// The value has the right kind but the wrong shape, e.g. a case list
    /// for a single-case field.
    #[error("field expects {expected}, got {actual}")]
    UnexpectedShape {
        /// The field's conversion strategy.
        expected: Strategy,
        /// Shape of the supplied value.
        actual: &'static str,
    },
}

impl InvalidValue {
    /// The offending raw value, for invalid enum values and non-iterable input.
    pub fn raw_value(&self) -> Option<&Value> {
        match self {
            Self::Enum(err) => err.invalid_value(),
            Self::NotIterableValue { value } => Some(value),
            _ => None,
        }
    }
}

/// Failure of [`FieldShape::resolve`](crate::shape::FieldShape::resolve).
///
/// The handler turns it into a [`HandlerError`] once it knows the direction
/// and the path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// The shape names no kind.
    #[error("enum field does not name its enum kind")]
    MissingEnumName,

    /// The kind or its association is misconfigured.
    #[error(transparent)]
    Config(#[from] EnumError),

    /// The field's expected single kind differs from the association.
    #[error(transparent)]
    Mismatch(InvalidValue),
}

/// A type expression that cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeExprError {
    /// The expression does not describe an enum type.
    #[error("{0:?} is not an enum type expression")]
    NotEnumType(String),

    /// Unbalanced or otherwise malformed brackets.
    #[error("malformed type expression {0:?}")]
    Malformed(String),

    /// The kind parameter is not a valid identifier.
    #[error("invalid enum kind in {expr:?}: {source}")]
    InvalidKind {
        /// The full expression.
        expr: String,
        /// Why the identifier was rejected.
        source: KindDefinitionError,
    },

    /// A parameter after the kind is neither `as_single` nor a scalar type,
    /// or repeats or is out of order.
    #[error("unexpected parameter {param:?} in {expr:?}")]
    UnexpectedParameter {
        /// The full expression.
        expr: String,
        /// The offending parameter.
        param: String,
    },

    /// `as_single` is not allowed on array elements.
    #[error("as_single cannot be used inside array<...>: {0:?}")]
    NestedCaseArray(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::error::Error as _;

    fn kind(id: &str) -> KindId {
        KindId::new(id).unwrap()
    }

    #[test]
    fn test_wrapped_cause_is_source() {
        let cause = InvalidValue::from(EnumError::InvalidEnumValue {
            kind: kind("app::RoleEnum"),
            value: json!("foo"),
        });
        let err = HandlerError::deserialization("single_enum", cause.clone());
        assert_eq!(err.field_path(), Some("single_enum"));
        assert_eq!(err.property_path(), None);
        assert_eq!(err.cause(), Some(&cause));
        assert_eq!(err.source().map(|s| s.to_string()), Some(cause.to_string()));
        assert_eq!(cause.raw_value(), Some(&json!("foo")));
    }

    #[test]
    fn test_serialization_display() {
        let err = HandlerError::serialization(
            "User::$multiEnum",
            InvalidValue::MappedClassMismatch {
                mapped: kind("app::RolesEnum"),
                value_kind: kind("app::RoleEnum"),
            },
        );
        assert_eq!(
            err.to_string(),
            "invalid enum value at User::$multiEnum: field is mapped to app::RolesEnum, got a value of app::RoleEnum"
        );
    }

    #[test]
    fn test_config_errors_keep_their_variant() {
        assert_eq!(
            HandlerError::from(EnumError::NotEnum("stdClass".into())),
            HandlerError::NotEnum("stdClass".into())
        );
        assert_eq!(
            HandlerError::from(EnumError::NotMultiEnum(kind("app::RoleEnum"))),
            HandlerError::NotMultiEnum(kind("app::RoleEnum"))
        );
        assert_eq!(
            HandlerError::from(EnumError::NoSingleEnumSpecified(kind("app::FooEnum"))),
            HandlerError::NoSingleEnumSpecified(kind("app::FooEnum"))
        );
        let mismatch = EnumError::AssociationMismatch {
            multi: kind("app::A"),
            single: kind("app::B"),
            reason: "flags without a case: X".into(),
        };
        assert_eq!(HandlerError::from(mismatch.clone()), HandlerError::Enum(mismatch));
    }

    #[test]
    fn test_not_iterable_raw_value() {
        let cause = InvalidValue::NotIterableValue { value: json!("foo") };
        assert_eq!(cause.raw_value(), Some(&json!("foo")));
        assert_eq!(cause.to_string(), "expected an array, got \"foo\"");
    }
}
