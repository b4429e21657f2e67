//! # Case Instances
//!
//! An [`EnumCase`] is the canonical instance of one case of one kind. Cases
//! are only handed out by the [`EnumRegistry`](crate::registry::EnumRegistry),
//! which memoizes exactly one instance per (kind, value). Equality is
//! therefore identity: two `EnumCase` handles are equal iff they point at the
//! same memoized instance.

use serde_json::Value;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::kind::{EnumKind, KindId};
use crate::scalar::Scalar;

#[derive(Debug)]
struct CaseInstance {
    kind: Arc<EnumKind>,
    index: usize,
    name: String,
    value: Scalar,
}

/// Canonical handle to one enum case. Cheap to clone.
#[derive(Clone)]
pub struct EnumCase(Arc<CaseInstance>);

impl EnumCase {
    /// Only the registry creates instances.
    pub(crate) fn new(kind: Arc<EnumKind>, index: usize) -> Option<Self> {
        let def = kind.cases().get(index)?.clone();
        Some(Self(Arc::new(CaseInstance {
            kind,
            index,
            name: def.name,
            value: def.value,
        })))
    }

    /// The kind this case belongs to.
    pub fn kind(&self) -> &Arc<EnumKind> {
        &self.0.kind
    }

    /// Identifier of the kind this case belongs to.
    pub fn kind_id(&self) -> &KindId {
        self.0.kind.id()
    }

    /// Case name, e.g. `ADMIN`.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Underlying value.
    pub fn value(&self) -> &Scalar {
        &self.0.value
    }

    /// Position in the kind's declaration order.
    pub fn index(&self) -> usize {
        self.0.index
    }

    /// Encode to the underlying value. Total: a case always has a valid value.
    pub fn encode(&self) -> Value {
        self.0.value.to_json()
    }

    /// Whether this case belongs to the kind `id`.
    pub fn is_of(&self, id: &KindId) -> bool {
        self.kind_id() == id
    }
}

impl PartialEq for EnumCase {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for EnumCase {}

impl Hash for EnumCase {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl std::fmt::Debug for EnumCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}::{}({})",
            self.kind_id().short_name(),
            self.name(),
            self.value()
        )
    }
}

impl std::fmt::Display for EnumCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.kind_id(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::ScalarType;

    fn role() -> Arc<EnumKind> {
        Arc::new(
            EnumKind::builder("app::RoleEnum", ScalarType::String)
                .case("ADMIN", "admin")
                .case("EMPLOYEE", "employee")
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_accessors() {
        let case = EnumCase::new(role(), 1).unwrap();
        assert_eq!(case.name(), "EMPLOYEE");
        assert_eq!(case.value(), &Scalar::from("employee"));
        assert_eq!(case.index(), 1);
        assert_eq!(case.kind_id().as_str(), "app::RoleEnum");
        assert_eq!(case.encode(), serde_json::json!("employee"));
    }

    #[test]
    fn test_out_of_range_index() {
        assert!(EnumCase::new(role(), 2).is_none());
    }

    #[test]
    fn test_equality_is_identity() {
        let kind = role();
        let a = EnumCase::new(kind.clone(), 0).unwrap();
        let b = EnumCase::new(kind, 0).unwrap();
        assert_eq!(a, a.clone());
        // Same value, distinct instance: only the registry guarantees sharing.
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug_and_display() {
        let case = EnumCase::new(role(), 0).unwrap();
        assert_eq!(format!("{case:?}"), "RoleEnum::ADMIN(\"admin\")");
        assert_eq!(case.to_string(), "app::RoleEnum::ADMIN");
    }
}
