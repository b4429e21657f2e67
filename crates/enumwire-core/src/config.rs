//! # Catalog Configuration
//!
//! Enum kinds are declared as data in a catalog file and built once at
//! startup. The catalog is YAML (or JSON, which is a YAML subset):
//!
//! ```yaml
//! kinds:
//!   - name: app::RoleEnum
//!     type: string
//!     cases:
//!       - { name: ADMIN, value: admin }
//!       - { name: EMPLOYEE, value: employee }
//!   - name: app::RolesEnum
//!     multi: true
//!     single_enum: app::RoleEnum
//!     cases:
//!       - { name: ADMIN, value: 1 }
//!       - { name: EMPLOYEE, value: 2 }
//!     combinations:
//!       - { name: ALL, value: 3 }
//! ```
//!
//! `type` may be omitted; ordinary kinds then take the type of their first
//! case and multi kinds are integer-backed.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, KindDefinitionError};
use crate::kind::{CaseDef, EnumKind, KindId};
use crate::scalar::ScalarType;

/// A catalog of enum kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Kinds in registration order.
    #[serde(default)]
    pub kinds: Vec<KindConfig>,
}

/// One kind in a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KindConfig {
    /// Kind identifier.
    pub name: String,
    /// Underlying type; inferred when omitted.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ScalarType>,
    /// Whether the kind is a bit-flag multi enum.
    #[serde(default)]
    pub multi: bool,
    /// Associated single-enum kind (multi only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_enum: Option<String>,
    /// Cases in declaration order.
    #[serde(default)]
    pub cases: Vec<CaseDef>,
    /// Named unions of flags (multi only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub combinations: Vec<CombinationConfig>,
}

/// A named union of flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CombinationConfig {
    /// Combination name.
    pub name: String,
    /// Bitmask.
    pub value: i64,
}

impl CatalogConfig {
    /// Parse a YAML (or JSON) catalog.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Parse a JSON catalog.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Read and parse a YAML catalog file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    /// Build and validate every kind, in declaration order.
    pub fn build_kinds(&self) -> Result<Vec<EnumKind>, KindDefinitionError> {
        self.kinds.iter().map(KindConfig::build).collect()
    }
}

impl KindConfig {
    /// Build and validate this kind.
    pub fn build(&self) -> Result<EnumKind, KindDefinitionError> {
        let mut builder = if self.multi {
            match self.value_type {
                None | Some(ScalarType::Integer) => EnumKind::multi_builder(&self.name),
                Some(actual) => {
                    return Err(KindDefinitionError::NonIntegerMulti {
                        kind: KindId::new(&self.name)?,
                        actual,
                    })
                }
            }
        } else {
            let value_type = self
                .value_type
                .or_else(|| self.cases.first().map(|c| c.value.scalar_type()))
                .unwrap_or(ScalarType::String);
            EnumKind::builder(&self.name, value_type)
        };

        for CaseDef { name, value } in &self.cases {
            builder = builder.case(name, value.clone());
        }
        for combination in &self.combinations {
            builder = builder.combination(&combination.name, combination.value);
        }
        if let Some(single) = &self.single_enum {
            builder = builder.single_enum(single);
        }
        builder.build()
    }
}
