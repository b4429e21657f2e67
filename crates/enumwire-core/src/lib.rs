//! # enumwire-core — Enum Value Model
//!
//! This crate is the leaf of the enumwire workspace. It defines what an enum
//! value *is*, independent of any wire format:
//!
//! 1. **Kinds are data.** An [`EnumKind`] is an ordered list of
//!    (name, value) cases, validated once when it is built and registered.
//!    Nothing is discovered through reflection.
//!
//! 2. **One instance per case.** The [`EnumRegistry`] memoizes a single
//!    [`EnumCase`] per (kind, case), so equality of cases is identity.
//!
//! 3. **Strict scalars.** A raw value matches a case only when its type and
//!    value both agree with the kind. `"1"` never matches `1`.
//!
//! 4. **Multi enums are bitmasks.** A [`MultiEnumValue`] is a bitmask over
//!    the power-of-two flags of a multi-enum kind, convertible to and from
//!    cases of its associated single-enum kind.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `enumwire-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod case;
pub mod config;
pub mod error;
pub mod kind;
pub mod multi;
pub mod registry;
pub mod scalar;

// Re-export primary types for ergonomic imports.
pub use case::EnumCase;
pub use config::{CatalogConfig, CombinationConfig, KindConfig};
pub use error::{ConfigError, EnumError, KindDefinitionError};
pub use kind::{CaseDef, EnumKind, EnumKindBuilder, KindFlavor, KindId};
pub use multi::{compose, decompose, decompose_to_single, MultiEnumValue};
pub use registry::{EnumLookup, EnumRegistry};
pub use scalar::{Scalar, ScalarType, UnknownScalarType};
