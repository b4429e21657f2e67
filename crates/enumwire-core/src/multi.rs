//! # Multi-Enum Values — Bitmask Algebra
//!
//! A [`MultiEnumValue`] is a bitmask tagged with its multi-enum kind. It is
//! equivalent to the set of declared flags whose bits are set.
//!
//! ## Permissive decoding
//!
//! [`MultiEnumValue::decode`] only checks that the raw value is a
//! non-negative integer. Bits that match no declared flag are kept as-is and
//! are invisible to [`decompose`]; [`MultiEnumValue::undeclared_bits`]
//! exposes them for callers that want to reject such input.
//!
//! ## Association
//!
//! [`compose`] and [`decompose_to_single`] translate between a bitmask and
//! cases of the associated single-enum kind, matching flags to cases by name.

use serde_json::Value;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::case::EnumCase;
use crate::error::EnumError;
use crate::kind::{EnumKind, KindId};
use crate::registry::EnumLookup;
use crate::scalar::Scalar;

/// A set of flags of one multi-enum kind, stored as a bitmask.
#[derive(Clone)]
pub struct MultiEnumValue {
    kind: Arc<EnumKind>,
    bits: i64,
}

impl MultiEnumValue {
    /// Wrap a bitmask. Undeclared bits are accepted.
    ///
    /// # Errors
    ///
    /// - [`EnumError::NotMultiEnum`] when `kind` is an ordinary kind.
    /// - [`EnumError::InvalidEnumValue`] when `bits` is negative.
    pub fn from_bits(kind: &Arc<EnumKind>, bits: i64) -> Result<Self, EnumError> {
        if !kind.is_multi() {
            return Err(EnumError::NotMultiEnum(kind.id().clone()));
        }
        if bits < 0 {
            return Err(EnumError::InvalidEnumValue {
                kind: kind.id().clone(),
                value: Value::from(bits),
            });
        }
        Ok(Self {
            kind: Arc::clone(kind),
            bits,
        })
    }

    /// The empty set.
    pub fn empty(kind: &Arc<EnumKind>) -> Result<Self, EnumError> {
        Self::from_bits(kind, 0)
    }

    /// Decode a raw bitmask.
    ///
    /// # Errors
    ///
    /// - [`EnumError::NotMultiEnum`] when `kind` is an ordinary kind.
    /// - [`EnumError::InvalidEnumValue`] carrying `raw` unchanged when it is
    ///   not a non-negative integer.
    pub fn decode(kind: &Arc<EnumKind>, raw: &Value) -> Result<Self, EnumError> {
        match Scalar::from_json(raw) {
            Some(Scalar::Integer(bits)) if bits >= 0 => Self::from_bits(kind, bits),
            _ if !kind.is_multi() => Err(EnumError::NotMultiEnum(kind.id().clone())),
            _ => Err(EnumError::InvalidEnumValue {
                kind: kind.id().clone(),
                value: raw.clone(),
            }),
        }
    }

    /// Union of flags of `kind` itself.
    ///
    /// # Errors
    ///
    /// [`EnumError::ForeignCase`] when a flag belongs to another kind.
    pub fn from_flags<'a>(
        kind: &Arc<EnumKind>,
        flags: impl IntoIterator<Item = &'a EnumCase>,
    ) -> Result<Self, EnumError> {
        let mut bits = 0;
        for flag in flags {
            if !flag.is_of(kind.id()) {
                return Err(EnumError::ForeignCase {
                    expected: kind.id().clone(),
                    actual: flag.kind_id().clone(),
                    case: flag.name().to_string(),
                });
            }
            bits |= kind.flag_bits(flag.index()).unwrap_or(0);
        }
        Self::from_bits(kind, bits)
    }

    /// The multi-enum kind.
    pub fn kind(&self) -> &Arc<EnumKind> {
        &self.kind
    }

    /// Identifier of the multi-enum kind.
    pub fn kind_id(&self) -> &KindId {
        self.kind.id()
    }

    /// The bitmask.
    pub fn bits(&self) -> i64 {
        self.bits
    }

    /// Encode as the integer bitmask.
    pub fn encode(&self) -> Value {
        Value::from(self.bits)
    }

    /// Whether no bit is set.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Whether every bit of `mask` is set.
    pub fn contains_bits(&self, mask: i64) -> bool {
        self.bits & mask == mask
    }

    /// Whether `flag`, a case of this value's kind, is set.
    pub fn contains(&self, flag: &EnumCase) -> bool {
        flag.is_of(self.kind.id())
            && self
                .kind
                .flag_bits(flag.index())
                .is_some_and(|bits| self.contains_bits(bits))
    }

    /// Bits that match no declared flag.
    pub fn undeclared_bits(&self) -> i64 {
        self.bits & !self.kind.declared_mask()
    }
}

impl PartialEq for MultiEnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.kind.id() == other.kind.id() && self.bits == other.bits
    }
}

impl Eq for MultiEnumValue {}

impl Hash for MultiEnumValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.id().hash(state);
        self.bits.hash(state);
    }
}

impl std::fmt::Debug for MultiEnumValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:#b})", self.kind.id().short_name(), self.bits)
    }
}

/// Flags of `value`'s kind whose bits are set, in declaration order.
pub fn decompose<L: EnumLookup + ?Sized>(lookup: &L, value: &MultiEnumValue) -> Vec<EnumCase> {
    let kind = value.kind();
    (0..kind.cases().len())
        .filter(|&i| {
            kind.flag_bits(i)
                .is_some_and(|bits| value.contains_bits(bits))
        })
        .filter_map(|i| lookup.case_at(kind, i))
        .collect()
}

/// Compose a bitmask of `kind` from cases of its associated single enum.
///
/// Order and duplicates in `cases` do not affect the result.
///
/// # Errors
///
/// - Association failures from [`EnumLookup::single_enum_of`].
/// - [`EnumError::ForeignCase`] when a case is not of the associated kind.
pub fn compose<L: EnumLookup + ?Sized>(
    lookup: &L,
    kind: &Arc<EnumKind>,
    cases: &[EnumCase],
) -> Result<MultiEnumValue, EnumError> {
    let single = lookup.single_enum_of(kind)?;
    let mut bits = 0;
    for case in cases {
        if !case.is_of(single.id()) {
            return Err(EnumError::ForeignCase {
                expected: single.id().clone(),
                actual: case.kind_id().clone(),
                case: case.name().to_string(),
            });
        }
        bits |= kind
            .position_of_name(case.name())
            .and_then(|i| kind.flag_bits(i))
            .unwrap_or(0);
    }
    MultiEnumValue::from_bits(kind, bits)
}

/// Cases of the associated single enum matching the set flags, in the multi
/// kind's declaration order.
///
/// # Errors
///
/// Association failures from [`EnumLookup::single_enum_of`].
pub fn decompose_to_single<L: EnumLookup + ?Sized>(
    lookup: &L,
    value: &MultiEnumValue,
) -> Result<Vec<EnumCase>, EnumError> {
    let single = lookup.single_enum_of(value.kind())?;
    decompose(lookup, value)
        .iter()
        .map(|flag| {
            lookup
                .case_by_name(&single, flag.name())
                .ok_or_else(|| EnumError::AssociationMismatch {
                    multi: value.kind_id().clone(),
                    single: single.id().clone(),
                    reason: format!("no case named {}", flag.name()),
                })
        })
        .collect()
}
