//! # Enum Field Handler
//!
//! [`EnumHandler`] is the entry point a host serializer calls for every
//! enum-typed field:
//!
//! - [`EnumHandler::serialize_field`] turns a [`FieldValue`] into the scalar
//!   or array written to the document.
//! - [`EnumHandler::deserialize_field`] turns a raw document value into a
//!   [`FieldValue`].
//!
//! The host supplies the declared [`FieldShape`] and the current [`Path`];
//! the handler never walks the object graph itself.
//!
//! ## Error precedence
//!
//! The shape is resolved before the value is touched, so configuration
//! errors win over value errors: missing kind name (deserialize only),
//! unknown kind, case array on a plain kind, case array without
//! association, association mismatch. Value errors follow and are wrapped
//! with the path; array elements get an index segment.

use std::borrow::Cow;
use std::sync::Arc;

use enumwire_core::{
    compose, decompose_to_single, EnumCase, EnumError, EnumKind, EnumLookup, EnumRegistry,
    KindId, MultiEnumValue, Scalar, ScalarType,
};
use serde_json::Value;

use crate::error::{HandlerError, InvalidValue, ResolveError};
use crate::path::Path;
use crate::shape::{Collection, FieldShape, ResolvedShape, Strategy};
use crate::value::FieldValue;

/// Converts enum field values using a shared [`EnumLookup`].
pub struct EnumHandler<L: EnumLookup + ?Sized = EnumRegistry> {
    lookup: Arc<L>,
}

impl<L: EnumLookup + ?Sized> Clone for EnumHandler<L> {
    fn clone(&self) -> Self {
        Self {
            lookup: Arc::clone(&self.lookup),
        }
    }
}

impl<L: EnumLookup + ?Sized> std::fmt::Debug for EnumHandler<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnumHandler").finish_non_exhaustive()
    }
}

impl<L: EnumLookup + ?Sized> EnumHandler<L> {
    pub fn new(lookup: Arc<L>) -> Self {
        Self { lookup }
    }

    /// The lookup this handler resolves kinds and cases through.
    pub fn lookup(&self) -> &Arc<L> {
        &self.lookup
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Encode `value` for a field declared as `shape` at `path`.
    ///
    /// A shape without a kind encodes the value as-is, except a case-array
    /// shape, which needs the association to encode.
    ///
    /// # Errors
    ///
    /// - [`HandlerError::MissingEnumName`] for a case-array shape without kind.
    /// - [`HandlerError::NotEnum`], [`HandlerError::NotMultiEnum`],
    ///   [`HandlerError::NoSingleEnumSpecified`] for misconfigured shapes.
    /// - [`HandlerError::SerializationInvalidValue`] wrapping
    ///   [`InvalidValue::MappedClassMismatch`] when the value belongs to
    ///   another kind, or [`InvalidValue::UnexpectedShape`].
    pub fn serialize_field(
        &self,
        shape: &FieldShape,
        value: &FieldValue,
        path: &Path,
    ) -> Result<Value, HandlerError> {
        let result = self.serialize_inner(shape, value, path);
        if let Err(err) = &result {
            tracing::debug!(
                path = %path.property_path(),
                shape = %shape,
                error = %err,
                "enum field serialization failed"
            );
        }
        result
    }

    fn serialize_inner(
        &self,
        shape: &FieldShape,
        value: &FieldValue,
        path: &Path,
    ) -> Result<Value, HandlerError> {
        if shape.kind().is_none() && shape.collection() != Collection::CaseArray {
            return Ok(value.encode());
        }
        let resolved = self.resolve(shape, Direction::Serialize, path)?;
        let kind = &resolved.kind;
        let wrap = |cause: InvalidValue| Direction::Serialize.wrap(path, cause);

        match (resolved.strategy, value) {
            (Strategy::Single, FieldValue::Single(case)) => {
                expect_kind(kind, case.kind_id()).map_err(wrap)?;
                Ok(case.encode())
            }
            (Strategy::ArrayOfSingle, FieldValue::Cases(cases)) => cases
                .iter()
                .enumerate()
                .map(|(i, case)| {
                    expect_kind(kind, case.kind_id())
                        .map(|()| case.encode())
                        .map_err(|cause| HandlerError::serialization(path.index(i).property_path(), cause))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            (Strategy::MultiAsBitmask, FieldValue::Multi(multi)) => {
                expect_kind(kind, multi.kind_id()).map_err(wrap)?;
                Ok(multi.encode())
            }
            (Strategy::ArrayOfBitmask, FieldValue::MultiList(values)) => values
                .iter()
                .enumerate()
                .map(|(i, multi)| {
                    expect_kind(kind, multi.kind_id())
                        .map(|()| multi.encode())
                        .map_err(|cause| HandlerError::serialization(path.index(i).property_path(), cause))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            (Strategy::MultiAsCaseArray, FieldValue::Multi(multi)) => {
                expect_kind(kind, multi.kind_id()).map_err(wrap)?;
                let cases = decompose_to_single(&*self.lookup, multi)?;
                Ok(Value::Array(cases.iter().map(EnumCase::encode).collect()))
            }
            (expected, other) => Err(wrap(match other.kind_id() {
                Some(actual) if actual != kind.id() => InvalidValue::MappedClassMismatch {
                    mapped: kind.id().clone(),
                    value_kind: actual.clone(),
                },
                _ => InvalidValue::UnexpectedShape {
                    expected,
                    actual: other.shape_name(),
                },
            })),
        }
    }

    // -----------------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------------

    /// Decode `raw` for a field declared as `shape` at `path`.
    ///
    /// Lookup is type-strict unless the shape declares a cast.
    ///
    /// # Errors
    ///
    /// - [`HandlerError::MissingEnumName`] when the shape names no kind.
    /// - [`HandlerError::NotEnum`], [`HandlerError::NotMultiEnum`],
    ///   [`HandlerError::NoSingleEnumSpecified`] for misconfigured shapes.
    /// - [`HandlerError::DeserializationInvalidValue`] wrapping
    ///   [`EnumError::InvalidEnumValue`], [`InvalidValue::NotIterableValue`]
    ///   or [`InvalidValue::MappedClassMismatch`].
    pub fn deserialize_field(
        &self,
        shape: &FieldShape,
        raw: &Value,
        path: &Path,
    ) -> Result<FieldValue, HandlerError> {
        let result = self.deserialize_inner(shape, raw, path);
        if let Err(err) = &result {
            tracing::debug!(
                path = %path.field_path(),
                shape = %shape,
                error = %err,
                "enum field deserialization failed"
            );
        }
        result
    }

    fn deserialize_inner(
        &self,
        shape: &FieldShape,
        raw: &Value,
        path: &Path,
    ) -> Result<FieldValue, HandlerError> {
        let resolved = self.resolve(shape, Direction::Deserialize, path)?;
        let wrap = |cause: InvalidValue| Direction::Deserialize.wrap(path, cause);

        match resolved.strategy {
            Strategy::Single => self
                .decode_case(&resolved, raw)
                .map(FieldValue::Single)
                .map_err(|err| wrap(err.into())),
            Strategy::MultiAsBitmask => {
                let raw = cast_raw(raw, resolved.cast);
                MultiEnumValue::decode(&resolved.kind, &raw)
                    .map(FieldValue::Multi)
                    .map_err(|err| wrap(err.into()))
            }
            Strategy::ArrayOfSingle => decode_elements(raw, path, |item| self.decode_case(&resolved, item))
                .map(FieldValue::Cases),
            Strategy::ArrayOfBitmask => decode_elements(raw, path, |item| {
                MultiEnumValue::decode(&resolved.kind, &cast_raw(item, resolved.cast))
            })
            .map(FieldValue::MultiList),
            Strategy::MultiAsCaseArray => {
                let cases = decode_elements(raw, path, |item| self.decode_case(&resolved, item))?;
                compose(&*self.lookup, &resolved.kind, &cases)
                    .map(FieldValue::Multi)
                    .map_err(|err| wrap(err.into()))
            }
        }
    }

    fn decode_case(&self, resolved: &ResolvedShape, raw: &Value) -> Result<EnumCase, EnumError> {
        let raw = cast_raw(raw, resolved.cast);
        self.lookup.lookup(resolved.element_kind(), &raw)
    }

    // -----------------------------------------------------------------------
    // Shared
    // -----------------------------------------------------------------------

    /// Resolve `shape`, turning configuration errors into handler errors.
    fn resolve(
        &self,
        shape: &FieldShape,
        direction: Direction,
        path: &Path,
    ) -> Result<ResolvedShape, HandlerError> {
        shape.resolve(&*self.lookup).map_err(|err| match err {
            ResolveError::MissingEnumName => HandlerError::MissingEnumName(direction.render(path)),
            ResolveError::Config(err) => err.into(),
            ResolveError::Mismatch(cause) => direction.wrap(path, cause),
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Serialize,
    Deserialize,
}

impl Direction {
    fn render(self, path: &Path) -> String {
        match self {
            Self::Serialize => path.property_path(),
            Self::Deserialize => path.field_path(),
        }
    }

    fn wrap(self, path: &Path, cause: InvalidValue) -> HandlerError {
        match self {
            Self::Serialize => HandlerError::serialization(path.property_path(), cause),
            Self::Deserialize => HandlerError::deserialization(path.field_path(), cause),
        }
    }
}

/// Decode every element of a raw array, tagging failures with the element
/// index.
fn decode_elements<T>(
    raw: &Value,
    path: &Path,
    decode: impl Fn(&Value) -> Result<T, EnumError>,
) -> Result<Vec<T>, HandlerError> {
    let Value::Array(items) = raw else {
        return Err(HandlerError::deserialization(
            path.field_path(),
            InvalidValue::NotIterableValue { value: raw.clone() },
        ));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            decode(item).map_err(|err| HandlerError::deserialization(path.index(i).field_path(), err))
        })
        .collect()
}

/// The kind of the value must be the field's kind.
fn expect_kind(kind: &Arc<EnumKind>, actual: &KindId) -> Result<(), InvalidValue> {
    if actual == kind.id() {
        Ok(())
    } else {
        Err(InvalidValue::MappedClassMismatch {
            mapped: kind.id().clone(),
            value_kind: actual.clone(),
        })
    }
}

/// Apply a declared cast. Values that cannot be cast are returned unchanged,
/// so a failed lookup reports what the document actually contained.
fn cast_raw(raw: &Value, cast: Option<ScalarType>) -> Cow<'_, Value> {
    match cast.and_then(|ty| Scalar::cast(raw, ty)) {
        Some(scalar) => Cow::Owned(scalar.to_json()),
        None => Cow::Borrowed(raw),
    }
}
