//! # Enum Registry
//!
//! The registry owns every registered [`EnumKind`] and memoizes one
//! [`EnumCase`] instance per (kind, case). Instances are created lazily on
//! first lookup (or eagerly through [`EnumRegistry::preload`]) and live as
//! long as the registry.
//!
//! ## Injection
//!
//! The registry is an explicit service, not a process-wide singleton. Code
//! that only needs to read goes through the [`EnumLookup`] trait, so tests
//! can substitute a pre-seeded or freshly reset registry.
//!
//! ## Concurrency
//!
//! Kinds and instances sit behind `parking_lot::RwLock`s. Memoization
//! re-checks under the write lock, so concurrent first lookups of the same
//! case still observe a single instance.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::case::EnumCase;
use crate::config::CatalogConfig;
use crate::error::{ConfigError, EnumError, KindDefinitionError};
use crate::kind::{EnumKind, KindId};
use crate::scalar::Scalar;

/// Read access to registered kinds and their canonical cases.
pub trait EnumLookup: Send + Sync {
    /// Resolve a kind identifier.
    ///
    /// # Errors
    ///
    /// [`EnumError::NotEnum`] carrying `id` when no such kind is registered.
    fn resolve_kind(&self, id: &str) -> Result<Arc<EnumKind>, EnumError>;

    /// The canonical case of `kind` at declaration position `index`.
    fn case_at(&self, kind: &Arc<EnumKind>, index: usize) -> Option<EnumCase>;

    /// Canonical case whose value equals `value`.
    fn case(&self, kind: &Arc<EnumKind>, value: &Scalar) -> Option<EnumCase> {
        kind.position_of(value).and_then(|i| self.case_at(kind, i))
    }

    /// Canonical case named `name`.
    fn case_by_name(&self, kind: &Arc<EnumKind>, name: &str) -> Option<EnumCase> {
        kind.position_of_name(name).and_then(|i| self.case_at(kind, i))
    }

    /// Every case of `kind` in declaration order.
    fn all_cases(&self, kind: &Arc<EnumKind>) -> Vec<EnumCase> {
        (0..kind.cases().len())
            .filter_map(|i| self.case_at(kind, i))
            .collect()
    }

    /// Decode a raw value into a case of `kind`, without any coercion.
    ///
    /// # Errors
    ///
    /// [`EnumError::InvalidEnumValue`] carrying `raw` unchanged when it is
    /// not a scalar of the kind's type or not a declared value.
    fn lookup(&self, kind: &Arc<EnumKind>, raw: &Value) -> Result<EnumCase, EnumError> {
        Scalar::from_json(raw)
            .and_then(|scalar| self.case(kind, &scalar))
            .ok_or_else(|| EnumError::InvalidEnumValue {
                kind: kind.id().clone(),
                value: raw.clone(),
            })
    }

    /// Resolve `kind` and decode `raw` into one of its cases.
    fn get(&self, kind: &str, raw: &Value) -> Result<EnumCase, EnumError> {
        let kind = self.resolve_kind(kind)?;
        self.lookup(&kind, raw)
    }

    /// The single-enum kind associated with the multi-enum `multi`.
    ///
    /// Verifies that both kinds line up case-for-case by name.
    ///
    /// # Errors
    ///
    /// - [`EnumError::NotMultiEnum`] when `multi` is an ordinary kind.
    /// - [`EnumError::NoSingleEnumSpecified`] when no association is declared.
    /// - [`EnumError::NotEnum`] when the associated kind is not registered.
    /// - [`EnumError::AssociationMismatch`] when names do not correspond.
    fn single_enum_of(&self, multi: &Arc<EnumKind>) -> Result<Arc<EnumKind>, EnumError> {
        if !multi.is_multi() {
            return Err(EnumError::NotMultiEnum(multi.id().clone()));
        }
        let id = multi
            .single_enum()
            .ok_or_else(|| EnumError::NoSingleEnumSpecified(multi.id().clone()))?;
        let single = self.resolve_kind(id.as_str())?;

        let mismatch = |reason: String| EnumError::AssociationMismatch {
            multi: multi.id().clone(),
            single: single.id().clone(),
            reason,
        };
        if single.is_multi() {
            return Err(mismatch("associated kind is itself a multi enum".into()));
        }
        let missing: Vec<&str> = multi
            .cases()
            .iter()
            .filter(|flag| single.position_of_name(&flag.name).is_none())
            .map(|flag| flag.name.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(mismatch(format!("flags without a case: {}", missing.join(", "))));
        }
        if single.cases().len() != multi.cases().len() {
            return Err(mismatch(format!(
                "{} flags but {} cases",
                multi.cases().len(),
                single.cases().len()
            )));
        }
        Ok(single)
    }
}

/// The concrete registry.
#[derive(Default)]
pub struct EnumRegistry {
    kinds: RwLock<HashMap<KindId, Arc<EnumKind>>>,
    instances: RwLock<HashMap<(KindId, usize), EnumCase>>,
}

impl std::fmt::Debug for EnumRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnumRegistry")
            .field("kind_count", &self.kinds.read().len())
            .field("instance_count", &self.instances.read().len())
            .finish()
    }
}

impl EnumRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding every kind in `config`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Definition`] when a kind is malformed or declared twice.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, ConfigError> {
        let registry = Self::new();
        for kind in config.build_kinds()? {
            registry.register(kind)?;
        }
        Ok(registry)
    }

    /// Load a YAML catalog file and build a registry from it.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = CatalogConfig::from_yaml_file(path)?;
        Self::from_config(&config)
    }

    /// Register a kind.
    ///
    /// # Errors
    ///
    /// [`KindDefinitionError::AlreadyRegistered`] when the identifier is taken.
    pub fn register(&self, kind: EnumKind) -> Result<Arc<EnumKind>, KindDefinitionError> {
        let mut kinds = self.kinds.write();
        if kinds.contains_key(kind.id()) {
            return Err(KindDefinitionError::AlreadyRegistered(kind.id().clone()));
        }
        let kind = Arc::new(kind);
        tracing::debug!(
            kind = %kind.id(),
            cases = kind.cases().len(),
            multi = kind.is_multi(),
            "registered enum kind"
        );
        kinds.insert(kind.id().clone(), Arc::clone(&kind));
        Ok(kind)
    }

    /// Registered kind identifiers, sorted.
    pub fn kind_ids(&self) -> Vec<KindId> {
        let mut ids: Vec<KindId> = self.kinds.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.kinds.read().len()
    }

    /// Whether no kind is registered.
    pub fn is_empty(&self) -> bool {
        self.kinds.read().is_empty()
    }

    /// Number of memoized case instances.
    pub fn instance_count(&self) -> usize {
        self.instances.read().len()
    }

    /// Memoize every case of every registered kind up front.
    ///
    /// Returns the number of instances held afterwards.
    pub fn preload(&self) -> usize {
        let kinds: Vec<Arc<EnumKind>> = self.kinds.read().values().cloned().collect();
        let mut missed = 0usize;
        for kind in &kinds {
            for index in 0..kind.cases().len() {
                if self.case_at(kind, index).is_none() {
                    missed += 1;
                    tracing::warn!(kind = %kind.id(), index, "enum case could not be memoized during preload");
                }
            }
        }
        let count = self.instance_count();
        tracing::debug!(kinds = kinds.len(), instances = count, missed, "preloaded enum registry");
        count
    }

    /// Drop every memoized instance. Kinds stay registered.
    ///
    /// Cases obtained before the reset are no longer identical to cases
    /// obtained after it; intended for tests.
    pub fn reset_instances(&self) {
        self.instances.write().clear();
        tracing::debug!("reset enum instance cache");
    }
}

impl EnumLookup for EnumRegistry {
    fn resolve_kind(&self, id: &str) -> Result<Arc<EnumKind>, EnumError> {
        self.kinds
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| EnumError::NotEnum(id.to_string()))
    }

    /// Only kinds handed out by this registry have instances; any other
    /// `Arc<EnumKind>`, even with the same identifier, yields `None`.
    fn case_at(&self, kind: &Arc<EnumKind>, index: usize) -> Option<EnumCase> {
        let key = (kind.id().clone(), index);
        if let Some(case) = self.instances.read().get(&key) {
            return Some(case.clone());
        }

        let registered = self.kinds.read().get(kind.id()).cloned()?;
        if !Arc::ptr_eq(&registered, kind) {
            return None;
        }

        let mut instances = self.instances.write();
        if let Some(case) = instances.get(&key) {
            return Some(case.clone());
        }
        let case = EnumCase::new(registered, index)?;
        tracing::trace!(kind = %kind.id(), case = case.name(), "memoized enum case");
        instances.insert(key, case.clone());
        Some(case)
    }
}
