//! # Enum Kinds — Data-Driven Descriptors
//!
//! An [`EnumKind`] is a named, closed, ordered list of cases. Kinds are plain
//! data: they are built once (in code through [`EnumKindBuilder`], or from a
//! catalog file through [`crate::config`]) and validated at build time, so a
//! registered kind is always well-formed.
//!
//! ## Invariants
//!
//! - At least one case.
//! - Case names are unique; case values are unique.
//! - Every case value has the kind's [`ScalarType`]; floats are finite.
//! - Multi-enum kinds are integer-backed, every case is a positive power of
//!   two, and every named combination only uses declared flag bits.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::KindDefinitionError;
use crate::scalar::{Scalar, ScalarType};

/// Identifier of an enum kind, e.g. `app::RoleEnum`.
///
/// Non-empty, no whitespace, and none of `<`, `>`, `,` so that identifiers
/// can appear inside type expressions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KindId(String);

impl KindId {
    /// Validate and wrap a kind identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, KindDefinitionError> {
        let id = id.into();
        let valid = !id.is_empty()
            && !id
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | ','));
        if valid {
            Ok(Self(id))
        } else {
            Err(KindDefinitionError::InvalidKindId(id))
        }
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last `::`-separated segment, used as the short display name.
    pub fn short_name(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }
}

impl TryFrom<String> for KindId {
    type Error = KindDefinitionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<KindId> for String {
    fn from(id: KindId) -> Self {
        id.0
    }
}

impl std::borrow::Borrow<str> for KindId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for KindId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for KindId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One declared case: a unique name and a unique underlying value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDef {
    /// Case name, e.g. `ADMIN`.
    pub name: String,
    /// Underlying value, e.g. `"admin"` or `1`.
    pub value: Scalar,
}

/// Whether a kind is an ordinary enum or a bit-flag multi enum.
#[derive(Debug, Clone, PartialEq)]
pub enum KindFlavor {
    /// Ordinary enum: one case per value.
    Single,
    /// Bit-flag enum: cases are flags, values are sets of flags.
    Multi {
        /// The ordinary kind whose cases name the flags, if declared.
        single_enum: Option<KindId>,
        /// Named unions of flags. Not cases; never enumerated.
        combinations: Vec<(String, i64)>,
    },
}

/// A validated enum kind.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumKind {
    id: KindId,
    value_type: ScalarType,
    cases: Vec<CaseDef>,
    flavor: KindFlavor,
}

impl EnumKind {
    /// Start building an ordinary kind.
    pub fn builder(id: impl Into<String>, value_type: ScalarType) -> EnumKindBuilder {
        EnumKindBuilder {
            id: id.into(),
            value_type,
            multi: false,
            cases: Vec::new(),
            combinations: Vec::new(),
            single_enum: None,
        }
    }

    /// Start building an integer-backed multi-enum kind.
    pub fn multi_builder(id: impl Into<String>) -> EnumKindBuilder {
        EnumKindBuilder {
            multi: true,
            ..Self::builder(id, ScalarType::Integer)
        }
    }

    /// The kind identifier.
    pub fn id(&self) -> &KindId {
        &self.id
    }

    /// The underlying type of every case.
    pub fn value_type(&self) -> ScalarType {
        self.value_type
    }

    /// Cases in declaration order.
    pub fn cases(&self) -> &[CaseDef] {
        &self.cases
    }

    /// The flavor of this kind.
    pub fn flavor(&self) -> &KindFlavor {
        &self.flavor
    }

    /// Whether this is a bit-flag multi enum.
    pub fn is_multi(&self) -> bool {
        matches!(self.flavor, KindFlavor::Multi { .. })
    }

    /// The declared single-enum association of a multi enum.
    pub fn single_enum(&self) -> Option<&KindId> {
        match &self.flavor {
            KindFlavor::Multi { single_enum, .. } => single_enum.as_ref(),
            KindFlavor::Single => None,
        }
    }

    /// Position of the case whose value equals `value`.
    pub fn position_of(&self, value: &Scalar) -> Option<usize> {
        self.cases.iter().position(|c| &c.value == value)
    }

    /// Position of the case named `name`.
    pub fn position_of_name(&self, name: &str) -> Option<usize> {
        self.cases.iter().position(|c| c.name == name)
    }

    /// Mask of a named combination, or of a single flag with that name.
    pub fn combination(&self, name: &str) -> Option<i64> {
        let KindFlavor::Multi { combinations, .. } = &self.flavor else {
            return None;
        };
        combinations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, mask)| *mask)
            .or_else(|| {
                self.position_of_name(name)
                    .and_then(|i| self.flag_bits(i))
            })
    }

    /// OR of every declared flag. Zero for ordinary kinds.
    pub fn declared_mask(&self) -> i64 {
        if !self.is_multi() {
            return 0;
        }
        (0..self.cases.len())
            .filter_map(|i| self.flag_bits(i))
            .fold(0, |acc, bits| acc | bits)
    }

    /// The bit of the flag at `index`, for multi kinds.
    pub(crate) fn flag_bits(&self, index: usize) -> Option<i64> {
        match self.cases.get(index).map(|c| &c.value) {
            Some(Scalar::Integer(bits)) if self.is_multi() => Some(*bits),
            _ => None,
        }
    }
}

/// Builder for [`EnumKind`]. All validation happens in [`EnumKindBuilder::build`].
#[derive(Debug, Clone)]
pub struct EnumKindBuilder {
    id: String,
    value_type: ScalarType,
    multi: bool,
    cases: Vec<CaseDef>,
    combinations: Vec<(String, i64)>,
    single_enum: Option<String>,
}

impl EnumKindBuilder {
    /// Declare a case. Declaration order is the canonical case order.
    pub fn case(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.cases.push(CaseDef {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Declare a named union of flags (multi enums only).
    pub fn combination(mut self, name: impl Into<String>, mask: i64) -> Self {
        self.combinations.push((name.into(), mask));
        self
    }

    /// Declare the single-enum association (multi enums only).
    pub fn single_enum(mut self, id: impl Into<String>) -> Self {
        self.single_enum = Some(id.into());
        self
    }

    /// Validate and produce the kind.
    pub fn build(self) -> Result<EnumKind, KindDefinitionError> {
        let id = KindId::new(self.id)?;

        if self.cases.is_empty() {
            return Err(KindDefinitionError::EmptyKind(id));
        }

        let mut names = HashSet::new();
        for (i, case) in self.cases.iter().enumerate() {
            if !names.insert(case.name.as_str()) {
                return Err(KindDefinitionError::DuplicateCaseName {
                    kind: id,
                    name: case.name.clone(),
                });
            }
            let actual = case.value.scalar_type();
            if actual != self.value_type {
                return Err(KindDefinitionError::CaseTypeMismatch {
                    kind: id,
                    case: case.name.clone(),
                    expected: self.value_type,
                    actual,
                });
            }
            if let Scalar::Float(f) = case.value {
                if !f.is_finite() {
                    return Err(KindDefinitionError::NonFiniteValue {
                        kind: id,
                        case: case.name.clone(),
                    });
                }
            }
            if self.cases[..i].iter().any(|prev| prev.value == case.value) {
                return Err(KindDefinitionError::DuplicateCaseValue {
                    kind: id,
                    value: case.value.clone(),
                });
            }
        }

        if !self.multi {
            if self.single_enum.is_some() {
                return Err(KindDefinitionError::MultiOnlyAttribute {
                    kind: id,
                    attribute: "a single enum association",
                });
            }
            if !self.combinations.is_empty() {
                return Err(KindDefinitionError::MultiOnlyAttribute {
                    kind: id,
                    attribute: "combinations",
                });
            }
            return Ok(EnumKind {
                id,
                value_type: self.value_type,
                cases: self.cases,
                flavor: KindFlavor::Single,
            });
        }

        let mut declared = 0i64;
        for case in &self.cases {
            // Non-integer values were already rejected by the type check.
            if let Scalar::Integer(bits) = case.value {
                if bits <= 0 || bits.count_ones() != 1 {
                    return Err(KindDefinitionError::InvalidFlag {
                        kind: id,
                        case: case.name.clone(),
                        value: bits,
                    });
                }
                declared |= bits;
            }
        }

        for (name, mask) in &self.combinations {
            if !names.insert(name.as_str()) {
                return Err(KindDefinitionError::DuplicateCaseName {
                    kind: id,
                    name: name.clone(),
                });
            }
            if *mask < 0 || mask & !declared != 0 {
                return Err(KindDefinitionError::InvalidCombination {
                    kind: id,
                    name: name.clone(),
                    value: *mask,
                });
            }
        }

        let single_enum = self.single_enum.map(KindId::new).transpose()?;

        Ok(EnumKind {
            id,
            value_type: ScalarType::Integer,
            cases: self.cases,
            flavor: KindFlavor::Multi {
                single_enum,
                combinations: self.combinations,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role() -> EnumKind {
        EnumKind::builder("app::RoleEnum", ScalarType::String)
            .case("ADMIN", "admin")
            .case("EMPLOYEE", "employee")
            .build()
            .unwrap()
    }

    #[test]
    fn test_kind_id_validation() {
        assert!(KindId::new("app::RoleEnum").is_ok());
        assert!(KindId::new("").is_err());
        assert!(KindId::new("a b").is_err());
        assert!(KindId::new("enum<x>").is_err());
        assert!(KindId::new("a,b").is_err());
    }

    #[test]
    fn test_kind_id_short_name() {
        assert_eq!(KindId::new("app::RoleEnum").unwrap().short_name(), "RoleEnum");
        assert_eq!(KindId::new("RoleEnum").unwrap().short_name(), "RoleEnum");
    }

    #[test]
    fn test_kind_id_serde_validates() {
        let id: KindId = serde_json::from_str("\"app::Role\"").unwrap();
        assert_eq!(id.as_str(), "app::Role");
        assert!(serde_json::from_str::<KindId>("\"\"").is_err());
    }

    #[test]
    fn test_single_kind_cases_in_order() {
        let kind = role();
        assert!(!kind.is_multi());
        let names: Vec<&str> = kind.cases().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["ADMIN", "EMPLOYEE"]);
        assert_eq!(kind.position_of(&Scalar::from("employee")), Some(1));
        assert_eq!(kind.position_of(&Scalar::from("foo")), None);
        assert_eq!(kind.declared_mask(), 0);
    }

    #[test]
    fn test_empty_kind_rejected() {
        let err = EnumKind::builder("app::Empty", ScalarType::String).build().unwrap_err();
        assert!(matches!(err, KindDefinitionError::EmptyKind(_)));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = EnumKind::builder("app::Dup", ScalarType::Integer)
            .case("A", 1)
            .case("A", 2)
            .build()
            .unwrap_err();
        assert!(matches!(err, KindDefinitionError::DuplicateCaseName { .. }));
    }

    #[test]
    fn test_duplicate_value_rejected() {
        let err = EnumKind::builder("app::Dup", ScalarType::Integer)
            .case("A", 1)
            .case("B", 1)
            .build()
            .unwrap_err();
        assert!(matches!(err, KindDefinitionError::DuplicateCaseValue { .. }));
    }

    #[test]
    fn test_case_type_mismatch_rejected() {
        let err = EnumKind::builder("app::Mixed", ScalarType::Integer)
            .case("A", 1)
            .case("B", "b")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            KindDefinitionError::CaseTypeMismatch {
                expected: ScalarType::Integer,
                actual: ScalarType::String,
                ..
            }
        ));
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let err = EnumKind::builder("app::F", ScalarType::Float)
            .case("INF", f64::INFINITY)
            .build()
            .unwrap_err();
        assert!(matches!(err, KindDefinitionError::NonFiniteValue { .. }));
    }

    #[test]
    fn test_multi_kind_flags() {
        let kind = EnumKind::multi_builder("app::RolesEnum")
            .case("ADMIN", 1)
            .case("EMPLOYEE", 2)
            .combination("ALL", 3)
            .single_enum("app::RoleEnum")
            .build()
            .unwrap();
        assert!(kind.is_multi());
        assert_eq!(kind.value_type(), ScalarType::Integer);
        assert_eq!(kind.single_enum().map(KindId::as_str), Some("app::RoleEnum"));
        assert_eq!(kind.declared_mask(), 3);
        assert_eq!(kind.combination("ALL"), Some(3));
        assert_eq!(kind.combination("EMPLOYEE"), Some(2));
        assert_eq!(kind.combination("NOBODY"), None);
        // combinations are not cases
        assert_eq!(kind.cases().len(), 2);
    }

    #[test]
    fn test_multi_flag_must_be_power_of_two() {
        for bad in [0, 3, -2] {
            let err = EnumKind::multi_builder("app::Bad")
                .case("A", 1)
                .case("B", bad)
                .build()
                .unwrap_err();
            assert!(matches!(err, KindDefinitionError::InvalidFlag { .. }), "{bad}");
        }
    }

    #[test]
    fn test_multi_combination_must_use_declared_bits() {
        let err = EnumKind::multi_builder("app::Bad")
            .case("A", 1)
            .case("B", 2)
            .combination("AC", 5)
            .build()
            .unwrap_err();
        assert!(matches!(err, KindDefinitionError::InvalidCombination { value: 5, .. }));
    }

    #[test]
    fn test_combination_name_shares_case_namespace() {
        let err = EnumKind::multi_builder("app::Bad")
            .case("A", 1)
            .combination("A", 1)
            .build()
            .unwrap_err();
        assert!(matches!(err, KindDefinitionError::DuplicateCaseName { .. }));
    }

    #[test]
    fn test_association_on_single_kind_rejected() {
        let err = EnumKind::builder("app::Role", ScalarType::String)
            .case("ADMIN", "admin")
            .single_enum("app::Other")
            .build()
            .unwrap_err();
        assert!(matches!(err, KindDefinitionError::MultiOnlyAttribute { .. }));
    }

    #[test]
    fn test_multi_kind_rejects_non_integer_cases() {
        let err = EnumKind::multi_builder("app::Bad")
            .case("A", "a")
            .build()
            .unwrap_err();
        assert!(matches!(err, KindDefinitionError::CaseTypeMismatch { .. }));
    }
}
