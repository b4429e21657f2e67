//! # Field Shapes
//!
//! A [`FieldShape`] is what host metadata declares about an enum-valued
//! field: the target kind, whether the field holds one value or an array,
//! and an optional scalar type raw input is cast to before lookup.
//!
//! ## Type expressions
//!
//! Shapes are written as type expressions and parsed with [`str::parse`]:
//!
//! | Expression                      | Strategy                                   |
//! |---------------------------------|--------------------------------------------|
//! | `enum`                          | serialize as-is, no kind to decode into    |
//! | `enum<K>`                       | single, or bitmask when `K` is multi       |
//! | `enum<K, string>`               | as above, raw input cast to string first   |
//! | `enum<K, as_single>`            | multi value as array of associated cases   |
//! | `enum<K, as_single, integer>`   | as above, each element cast first          |
//! | `array<enum<K>>`                | ordered array of single cases, or of       |
//! |                                 | bitmasks when `K` is multi                 |
//! | `array<enum<K, float>>`         | as above, each element cast first          |
//!
//! Scalar types are `integer` (`int`), `string`, `float` and `boolean`
//! (`bool`).
//!
//! ## Resolution
//!
//! [`FieldShape::resolve`] looks the kind up and picks a [`Strategy`]. All
//! configuration checks happen here, before any value is inspected.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use enumwire_core::{EnumKind, EnumLookup, KindId, ScalarType};
use serde::{Deserialize, Serialize};

use crate::error::{InvalidValue, ResolveError, TypeExprError};

/// How many values a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// One case, or one multi-enum bitmask.
    Scalar,
    /// An ordered array of single cases, or of multi-enum bitmasks
    /// (`array<enum<K>>`).
    Array,
    /// A multi-enum value written as an array of associated single cases
    /// (`enum<K, as_single>`).
    CaseArray,
}

/// Conversion strategy of a resolved field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// One case ⇄ one scalar.
    Single,
    /// Ordered cases ⇄ ordered scalars; duplicates allowed.
    ArrayOfSingle,
    /// One multi-enum value ⇄ one integer.
    MultiAsBitmask,
    /// Ordered multi-enum values ⇄ ordered integers.
    ArrayOfBitmask,
    /// One multi-enum value ⇄ scalars of the associated single kind.
    MultiAsCaseArray,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Single => "a single case",
            Self::ArrayOfSingle => "an array of cases",
            Self::MultiAsBitmask => "a multi enum bitmask",
            Self::ArrayOfBitmask => "an array of multi enum bitmasks",
            Self::MultiAsCaseArray => "a multi enum as an array of cases",
        })
    }
}

/// Declared type of an enum-valued field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldShape {
    kind: Option<String>,
    collection: Collection,
    cast: Option<ScalarType>,
    single_enum: Option<KindId>,
}

impl FieldShape {
    /// `enum<kind>`.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            collection: Collection::Scalar,
            cast: None,
            single_enum: None,
        }
    }

    /// `enum`, with no kind.
    pub fn unnamed() -> Self {
        Self {
            kind: None,
            collection: Collection::Scalar,
            cast: None,
            single_enum: None,
        }
    }

    /// `array<enum<kind>>`.
    pub fn array(kind: impl Into<String>) -> Self {
        Self {
            collection: Collection::Array,
            ..Self::new(kind)
        }
    }

    /// `enum<kind, as_single>`.
    pub fn case_array(kind: impl Into<String>) -> Self {
        Self {
            collection: Collection::CaseArray,
            ..Self::new(kind)
        }
    }

    /// Cast raw input to `ty` before lookup.
    pub fn with_cast(mut self, ty: ScalarType) -> Self {
        self.cast = Some(ty);
        self
    }

    /// Require the association of a case-array field to be `single`.
    pub fn expecting_single_enum(mut self, single: KindId) -> Self {
        self.single_enum = Some(single);
        self
    }

    /// The declared kind, if any.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn cast(&self) -> Option<ScalarType> {
        self.cast
    }

    pub fn expected_single_enum(&self) -> Option<&KindId> {
        self.single_enum.as_ref()
    }

    /// Resolve the kind and choose a strategy.
    ///
    /// Checks run in order: kind named, kind registered, then for case-array
    /// fields the kind is multi, has an association, and the association
    /// matches any expected single kind.
    pub fn resolve<L: EnumLookup + ?Sized>(&self, lookup: &L) -> Result<ResolvedShape, ResolveError> {
        let name = self.kind.as_deref().ok_or(ResolveError::MissingEnumName)?;
        let kind = lookup.resolve_kind(name)?;

        let (strategy, single_kind) = match self.collection {
            Collection::Scalar if kind.is_multi() => (Strategy::MultiAsBitmask, None),
            Collection::Scalar => (Strategy::Single, None),
            Collection::Array if kind.is_multi() => (Strategy::ArrayOfBitmask, None),
            Collection::Array => (Strategy::ArrayOfSingle, None),
            Collection::CaseArray => {
                let single = lookup.single_enum_of(&kind)?;
                if let Some(expected) = &self.single_enum {
                    if expected != single.id() {
                        return Err(ResolveError::Mismatch(InvalidValue::MappedClassMismatch {
                            mapped: expected.clone(),
                            value_kind: single.id().clone(),
                        }));
                    }
                }
                (Strategy::MultiAsCaseArray, Some(single))
            }
        };

        Ok(ResolvedShape {
            strategy,
            kind,
            single_kind,
            cast: self.cast,
        })
    }
}

/// A shape whose kind has been looked up.
#[derive(Debug, Clone)]
pub struct ResolvedShape {
    /// Chosen strategy.
    pub strategy: Strategy,
    /// The declared kind.
    pub kind: Arc<EnumKind>,
    /// Associated single kind, for [`Strategy::MultiAsCaseArray`].
    pub single_kind: Option<Arc<EnumKind>>,
    /// Scalar type raw input is cast to.
    pub cast: Option<ScalarType>,
}

impl ResolvedShape {
    /// The kind raw scalars are looked up in: the associated single kind
    /// for case arrays, the declared kind otherwise.
    pub fn element_kind(&self) -> &Arc<EnumKind> {
        self.single_kind.as_ref().unwrap_or(&self.kind)
    }
}

// ---------------------------------------------------------------------------
// Type expressions
// ---------------------------------------------------------------------------

impl FromStr for FieldShape {
    type Err = TypeExprError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let trimmed = expr.trim();
        if let Some(inner) = generic_args(trimmed, "array") {
            let element = parse_enum(inner.trim(), expr)?;
            if element.collection == Collection::CaseArray {
                return Err(TypeExprError::NestedCaseArray(expr.to_string()));
            }
            return Ok(Self {
                collection: Collection::Array,
                ..element
            });
        }
        if trimmed.starts_with("array") {
            return Err(TypeExprError::Malformed(expr.to_string()));
        }
        parse_enum(trimmed, expr)
    }
}

/// Text between `name<` and the final `>`.
fn generic_args<'a>(expr: &'a str, name: &str) -> Option<&'a str> {
    expr.strip_prefix(name)?
        .trim_start()
        .strip_prefix('<')?
        .strip_suffix('>')
}

fn parse_enum(expr: &str, full: &str) -> Result<FieldShape, TypeExprError> {
    if expr == "enum" {
        return Ok(FieldShape::unnamed());
    }
    let Some(args) = generic_args(expr, "enum") else {
        return Err(if expr.starts_with("enum") {
            TypeExprError::Malformed(full.to_string())
        } else {
            TypeExprError::NotEnumType(full.to_string())
        });
    };

    let mut params = args.split(',').map(str::trim);
    let kind = params.next().unwrap_or_default();
    KindId::new(kind).map_err(|source| TypeExprError::InvalidKind {
        expr: full.to_string(),
        source,
    })?;

    let mut shape = FieldShape::new(kind);
    for param in params {
        let unexpected = || TypeExprError::UnexpectedParameter {
            expr: full.to_string(),
            param: param.to_string(),
        };
        if param == "as_single" {
            if shape.collection != Collection::Scalar || shape.cast.is_some() {
                return Err(unexpected());
            }
            shape.collection = Collection::CaseArray;
        } else {
            let ty = param.parse::<ScalarType>().map_err(|_| unexpected())?;
            if shape.cast.is_some() {
                return Err(unexpected());
            }
            shape.cast = Some(ty);
        }
    }
    Ok(shape)
}

impl fmt::Display for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let array = self.collection == Collection::Array;
        if array {
            f.write_str("array<")?;
        }
        match &self.kind {
            None => f.write_str("enum")?,
            Some(kind) => {
                write!(f, "enum<{kind}")?;
                if self.collection == Collection::CaseArray {
                    f.write_str(", as_single")?;
                }
                if let Some(ty) = self.cast {
                    write!(f, ", {ty}")?;
                }
                f.write_str(">")?;
            }
        }
        if array {
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for FieldShape {
    type Error = TypeExprError;

    fn try_from(expr: String) -> Result<Self, Self::Error> {
        expr.parse()
    }
}

impl From<FieldShape> for String {
    fn from(shape: FieldShape) -> Self {
        shape.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enumwire_core::{EnumError, EnumRegistry};

    fn registry() -> EnumRegistry {
        let registry = EnumRegistry::new();
        registry
            .register(
                EnumKind::builder("app::RoleEnum", ScalarType::String)
                    .case("ADMIN", "admin")
                    .case("EMPLOYEE", "employee")
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
            .register(
                EnumKind::multi_builder("app::RolesEnum")
                    .case("ADMIN", 1)
                    .case("EMPLOYEE", 2)
                    .single_enum("app::RoleEnum")
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
            .register(
                EnumKind::multi_builder("app::FooEnum")
                    .case("FOO", 1)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_parse_forms() {
        let cases = [
            ("enum", FieldShape::unnamed()),
            ("enum<app::RoleEnum>", FieldShape::new("app::RoleEnum")),
            (
                "enum<app::RoleEnum, string>",
                FieldShape::new("app::RoleEnum").with_cast(ScalarType::String),
            ),
            ("enum<app::RolesEnum, as_single>", FieldShape::case_array("app::RolesEnum")),
            (
                "enum<app::RolesEnum, as_single, int>",
                FieldShape::case_array("app::RolesEnum").with_cast(ScalarType::Integer),
            ),
            ("array<enum<app::RoleEnum>>", FieldShape::array("app::RoleEnum")),
            (
                "array< enum<app::RoleEnum, bool> >",
                FieldShape::array("app::RoleEnum").with_cast(ScalarType::Boolean),
            ),
        ];
        for (expr, expected) in cases {
            assert_eq!(expr.parse::<FieldShape>().unwrap(), expected, "{expr}");
        }
    }

    #[test]
    fn test_display_is_canonical() {
        for expr in [
            "enum",
            "enum<app::RoleEnum>",
            "enum<app::RoleEnum, string>",
            "enum<app::RolesEnum, as_single>",
            "enum<app::RolesEnum, as_single, integer>",
            "array<enum<app::RoleEnum>>",
            "array<enum<app::RoleEnum, float>>",
        ] {
            assert_eq!(expr.parse::<FieldShape>().unwrap().to_string(), expr);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("string".parse::<FieldShape>(), Err(TypeExprError::NotEnumType(_))));
        assert!(matches!("enum<app::Role".parse::<FieldShape>(), Err(TypeExprError::Malformed(_))));
        assert!(matches!("array<enum".parse::<FieldShape>(), Err(TypeExprError::Malformed(_))));
        assert!(matches!("enum<>".parse::<FieldShape>(), Err(TypeExprError::InvalidKind { .. })));
        assert!(matches!(
            "enum<app::Role, decimal>".parse::<FieldShape>(),
            Err(TypeExprError::UnexpectedParameter { .. })
        ));
        assert!(matches!(
            "enum<app::Role, string, as_single>".parse::<FieldShape>(),
            Err(TypeExprError::UnexpectedParameter { .. })
        ));
        assert!(matches!(
            "enum<app::Role, string, int>".parse::<FieldShape>(),
            Err(TypeExprError::UnexpectedParameter { .. })
        ));
        assert!(matches!(
            "array<enum<app::Roles, as_single>>".parse::<FieldShape>(),
            Err(TypeExprError::NestedCaseArray(_))
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let shape: FieldShape = serde_json::from_str("\"enum<app::RolesEnum, as_single>\"").unwrap();
        assert_eq!(shape, FieldShape::case_array("app::RolesEnum"));
        assert_eq!(
            serde_json::to_string(&FieldShape::array("app::RoleEnum")).unwrap(),
            "\"array<enum<app::RoleEnum>>\""
        );
        assert!(serde_json::from_str::<FieldShape>("\"nope\"").is_err());
    }

    #[test]
    fn test_resolve_strategies() {
        let registry = registry();
        let single = FieldShape::new("app::RoleEnum").resolve(&registry).unwrap();
        assert_eq!(single.strategy, Strategy::Single);

        let bitmask = FieldShape::new("app::RolesEnum").resolve(&registry).unwrap();
        assert_eq!(bitmask.strategy, Strategy::MultiAsBitmask);

        let array = FieldShape::array("app::RoleEnum").resolve(&registry).unwrap();
        assert_eq!(array.strategy, Strategy::ArrayOfSingle);

        let bitmasks = FieldShape::array("app::RolesEnum").resolve(&registry).unwrap();
        assert_eq!(bitmasks.strategy, Strategy::ArrayOfBitmask);
        assert_eq!(bitmasks.element_kind().id().as_str(), "app::RolesEnum");

        let cases = FieldShape::case_array("app::RolesEnum").resolve(&registry).unwrap();
        assert_eq!(cases.strategy, Strategy::MultiAsCaseArray);
        assert_eq!(cases.element_kind().id().as_str(), "app::RoleEnum");
        assert_eq!(cases.kind.id().as_str(), "app::RolesEnum");
    }

    #[test]
    fn test_resolve_configuration_errors() {
        let registry = registry();
        assert_eq!(
            FieldShape::unnamed().resolve(&registry).unwrap_err(),
            ResolveError::MissingEnumName
        );
        assert_eq!(
            FieldShape::new("stdClass").resolve(&registry).unwrap_err(),
            ResolveError::Config(EnumError::NotEnum("stdClass".into()))
        );
        assert!(matches!(
            FieldShape::case_array("app::RoleEnum").resolve(&registry).unwrap_err(),
            ResolveError::Config(EnumError::NotMultiEnum(_))
        ));
        assert!(matches!(
            FieldShape::case_array("app::FooEnum").resolve(&registry).unwrap_err(),
            ResolveError::Config(EnumError::NoSingleEnumSpecified(_))
        ));
    }

    #[test]
    fn test_resolve_expected_single_mismatch() {
        let registry = registry();
        let shape = FieldShape::case_array("app::RolesEnum")
            .expecting_single_enum(KindId::new("app::OtherRole").unwrap());
        assert_eq!(
            shape.resolve(&registry).unwrap_err(),
            ResolveError::Mismatch(InvalidValue::MappedClassMismatch {
                mapped: KindId::new("app::OtherRole").unwrap(),
                value_kind: KindId::new("app::RoleEnum").unwrap(),
            })
        );

        let matching = FieldShape::case_array("app::RolesEnum")
            .expecting_single_enum(KindId::new("app::RoleEnum").unwrap());
        assert!(matching.resolve(&registry).is_ok());
    }
}
