//! # enumwire-serde — Enum Field Handler
//!
//! Converts enum-typed fields between their in-memory values and the scalars
//! or arrays a document carries. A host serializer walks the object graph
//! and calls [`EnumHandler`] once per enum field with:
//!
//! - the declared [`FieldShape`], usually parsed from a type expression such
//!   as `enum<app::RoleEnum>` or `enum<app::RolesEnum, as_single>`;
//! - the value to convert;
//! - the current [`Path`], used to qualify errors.
//!
//! ## Strategies
//!
//! | Shape                  | In memory                      | In the document          |
//! |------------------------|--------------------------------|--------------------------|
//! | `enum<K>`              | one case                       | its value                |
//! | `enum<K>`, `K` multi   | multi-enum value               | the integer bitmask      |
//! | `array<enum<K>>`       | ordered cases                  | ordered values           |
//! | `array<enum<K>>`, `K` multi | ordered multi-enum values | ordered bitmasks         |
//! | `enum<K, as_single>`   | multi-enum value               | values of the associated single kind |
//!
//! ## Errors
//!
//! See [`error`]: value errors are wrapped with the field path (decode) or
//! property path (encode); configuration errors surface unwrapped.
//!
//! ## Host walker
//!
//! [`graph::ObjectGraph`] is a minimal host for objects described by
//! [`graph::ClassMetadata`], used to exercise the handler end to end.

pub mod error;
pub mod graph;
pub mod handler;
pub mod path;
pub mod shape;
pub mod value;

pub use error::{HandlerError, InvalidValue, ResolveError, TypeExprError};
pub use graph::{ClassMetadata, GraphError, Object, ObjectGraph, PropertyKind, PropertyMetadata, PropertyValue};
pub use handler::EnumHandler;
pub use path::{Path, Segment};
pub use shape::{Collection, FieldShape, ResolvedShape, Strategy};
pub use value::FieldValue;
