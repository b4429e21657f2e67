//! # Error Hierarchy
//!
//! Structured error types for the enum value model, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! - [`EnumError`] covers everything that can go wrong while looking up,
//!   composing or decomposing enum values at conversion time.
//! - [`KindDefinitionError`] covers malformed kind descriptors, rejected at
//!   registration time before any value is converted.
//! - [`ConfigError`] covers loading a catalog of kinds from YAML or JSON.

use serde_json::Value;
use thiserror::Error;

use crate::kind::KindId;
use crate::scalar::{Scalar, ScalarType};

/// Failures of the enum value model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnumError {
    /// The raw value is not a declared member of the kind.
    ///
    /// Carries the offending raw value exactly as it was supplied, including
    /// non-scalar values such as arrays and objects.
    #[error("invalid value {value} for enum {kind}")]
    InvalidEnumValue {
        /// The kind the value was checked against.
        kind: KindId,
        /// The raw value as supplied.
        value: Value,
    },

    /// The identifier does not resolve to a registered enum kind.
    #[error("{0} is not a registered enum kind")]
    NotEnum(String),

    /// A multi-enum operation was requested on an ordinary kind.
    #[error("{0} is not a multi enum")]
    NotMultiEnum(KindId),

    /// A multi-enum kind has no single-enum association.
    #[error("no single enum specified for multi enum {0}")]
    NoSingleEnumSpecified(KindId),

    /// A case was supplied that does not belong to the expected kind.
    #[error("case {case} of {actual} does not belong to {expected}")]
    ForeignCase {
        /// The kind the case was expected to belong to.
        expected: KindId,
        /// The kind the case actually belongs to.
        actual: KindId,
        /// Name of the offending case.
        case: String,
    },

    /// The declared single-enum association does not match case-for-case.
    #[error("multi enum {multi} does not correspond to single enum {single}: {reason}")]
    AssociationMismatch {
        /// The multi-enum kind.
        multi: KindId,
        /// The associated single-enum kind.
        single: KindId,
        /// Which case names failed to line up.
        reason: String,
    },

    /// A kind descriptor was rejected.
    #[error("malformed enum kind: {0}")]
    Definition(#[from] KindDefinitionError),
}

impl EnumError {
    /// The offending raw value, for [`EnumError::InvalidEnumValue`].
    pub fn invalid_value(&self) -> Option<&Value> {
        match self {
            Self::InvalidEnumValue { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// A kind descriptor that cannot be registered.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KindDefinitionError {
    /// Kind identifiers must be non-empty and free of whitespace, `<`, `>` and `,`.
    #[error("invalid enum kind identifier {0:?}")]
    InvalidKindId(String),

    /// A kind must declare at least one case.
    #[error("enum {0} declares no cases")]
    EmptyKind(KindId),

    /// Two cases (or a case and a combination) share a name.
    #[error("enum {kind} declares {name} more than once")]
    DuplicateCaseName {
        /// The kind being defined.
        kind: KindId,
        /// The repeated name.
        name: String,
    },

    /// Two cases share an underlying value.
    #[error("enum {kind} declares value {value} more than once")]
    DuplicateCaseValue {
        /// The kind being defined.
        kind: KindId,
        /// The repeated value.
        value: Scalar,
    },

    /// A case value does not have the kind's underlying type.
    #[error("case {case} of enum {kind} is {actual}, expected {expected}")]
    CaseTypeMismatch {
        /// The kind being defined.
        kind: KindId,
        /// The offending case.
        case: String,
        /// The kind's underlying type.
        expected: ScalarType,
        /// The type of the supplied value.
        actual: ScalarType,
    },

    /// Float cases must be finite.
    #[error("case {case} of enum {kind} is not a finite float")]
    NonFiniteValue {
        /// The kind being defined.
        kind: KindId,
        /// The offending case.
        case: String,
    },

    /// Multi-enum flags must be positive powers of two.
    #[error("flag {case} of multi enum {kind} is {value}, expected a positive power of two")]
    InvalidFlag {
        /// The kind being defined.
        kind: KindId,
        /// The offending flag.
        case: String,
        /// The supplied value.
        value: i64,
    },

    /// Combinations must only use bits of declared flags.
    #[error("combination {name} of multi enum {kind} uses undeclared bits: {value:#b}")]
    InvalidCombination {
        /// The kind being defined.
        kind: KindId,
        /// The offending combination.
        name: String,
        /// The supplied mask.
        value: i64,
    },

    /// Multi-enum kinds are always integer-backed.
    #[error("multi enum {kind} must be integer-backed, not {actual}")]
    NonIntegerMulti {
        /// The kind being defined.
        kind: KindId,
        /// The declared type.
        actual: ScalarType,
    },

    /// Associations and combinations only apply to multi-enum kinds.
    #[error("enum {kind} is not a multi enum and cannot declare {attribute}")]
    MultiOnlyAttribute {
        /// The kind being defined.
        kind: KindId,
        /// The attribute that was declared.
        attribute: &'static str,
    },

    /// The registry already holds a kind with this identifier.
    #[error("enum {0} is already registered")]
    AlreadyRegistered(KindId),
}

/// Failure to load a catalog of enum kinds.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The catalog file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog is not valid YAML or does not match the catalog shape.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The catalog is not valid JSON or does not match the catalog shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A kind in the catalog is malformed.
    #[error("catalog definition error: {0}")]
    Definition(#[from] KindDefinitionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(id: &str) -> KindId {
        KindId::new(id).unwrap()
    }

    #[test]
    fn invalid_enum_value_display_carries_raw_value() {
        let err = EnumError::InvalidEnumValue {
            kind: kind("app::Role"),
            value: serde_json::json!("foo"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("\"foo\""));
        assert!(msg.contains("app::Role"));
    }

    #[test]
    fn invalid_value_accessor() {
        let err = EnumError::InvalidEnumValue {
            kind: kind("app::Role"),
            value: serde_json::json!([1, 2, 3]),
        };
        assert_eq!(err.invalid_value(), Some(&serde_json::json!([1, 2, 3])));
        assert_eq!(EnumError::NotEnum("stdClass".into()).invalid_value(), None);
    }

    #[test]
    fn not_enum_display() {
        let err = EnumError::NotEnum("stdClass".into());
        assert_eq!(err.to_string(), "stdClass is not a registered enum kind");
    }

    #[test]
    fn definition_error_converts() {
        let err: EnumError = KindDefinitionError::EmptyKind(kind("app::Empty")).into();
        assert!(matches!(err, EnumError::Definition(_)));
        assert!(err.to_string().contains("declares no cases"));
    }

    #[test]
    fn invalid_combination_display_is_binary() {
        let err = KindDefinitionError::InvalidCombination {
            kind: kind("app::Roles"),
            name: "ALL".into(),
            value: 5,
        };
        assert!(err.to_string().contains("0b101"));
    }
}
