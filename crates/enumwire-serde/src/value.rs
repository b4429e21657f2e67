//! In-memory value of an enum-typed field.

use enumwire_core::{EnumCase, KindId, MultiEnumValue};
use serde_json::Value;

/// What an enum field holds on the object side.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// One case.
    Single(EnumCase),
    /// A multi-enum bitmask, whether written as an integer or as a case array.
    Multi(MultiEnumValue),
    /// An ordered list of cases.
    Cases(Vec<EnumCase>),
    /// An ordered list of multi-enum bitmasks.
    MultiList(Vec<MultiEnumValue>),
}

impl FieldValue {
    /// Kind of the value. For a list this is the kind of its first
    /// element; an empty list has none.
    pub fn kind_id(&self) -> Option<&KindId> {
        match self {
            Self::Single(case) => Some(case.kind_id()),
            Self::Multi(value) => Some(value.kind_id()),
            Self::Cases(cases) => cases.first().map(EnumCase::kind_id),
            Self::MultiList(values) => values.first().map(MultiEnumValue::kind_id),
        }
    }

    /// Short description of the shape, for error messages.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Single(_) => "a single case",
            Self::Multi(_) => "a multi enum value",
            Self::Cases(_) => "an array of cases",
            Self::MultiList(_) => "an array of multi enum values",
        }
    }

    /// Encode without consulting any field metadata: a case as its value,
    /// a multi-enum value as its bitmask, a list as a list of values.
    pub fn encode(&self) -> Value {
        match self {
            Self::Single(case) => case.encode(),
            Self::Multi(value) => value.encode(),
            Self::Cases(cases) => Value::Array(cases.iter().map(EnumCase::encode).collect()),
            Self::MultiList(values) => {
                Value::Array(values.iter().map(MultiEnumValue::encode).collect())
            }
        }
    }

    pub fn as_single(&self) -> Option<&EnumCase> {
        match self {
            Self::Single(case) => Some(case),
            _ => None,
        }
    }

    pub fn as_multi(&self) -> Option<&MultiEnumValue> {
        match self {
            Self::Multi(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_cases(&self) -> Option<&[EnumCase]> {
        match self {
            Self::Cases(cases) => Some(cases),
            _ => None,
        }
    }

    pub fn as_multi_list(&self) -> Option<&[MultiEnumValue]> {
        match self {
            Self::MultiList(values) => Some(values),
            _ => None,
        }
    }
}

impl From<EnumCase> for FieldValue {
    fn from(case: EnumCase) -> Self {
        Self::Single(case)
    }
}

impl From<MultiEnumValue> for FieldValue {
    fn from(value: MultiEnumValue) -> Self {
        Self::Multi(value)
    }
}

impl From<Vec<EnumCase>> for FieldValue {
    fn from(cases: Vec<EnumCase>) -> Self {
        Self::Cases(cases)
    }
}

impl From<Vec<MultiEnumValue>> for FieldValue {
    fn from(values: Vec<MultiEnumValue>) -> Self {
        Self::MultiList(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enumwire_core::{EnumKind, EnumLookup, EnumRegistry, ScalarType};
    use serde_json::json;

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
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_encode_without_metadata() {
        let registry = registry();
        let admin = registry.get("app::RoleEnum", &json!("admin")).unwrap();
        let employee = registry.get("app::RoleEnum", &json!("employee")).unwrap();
        let roles = registry.resolve_kind("app::RolesEnum").unwrap();

        assert_eq!(FieldValue::from(admin.clone()).encode(), json!("admin"));
        assert_eq!(
            FieldValue::from(MultiEnumValue::from_bits(&roles, 3).unwrap()).encode(),
            json!(3)
        );
        assert_eq!(
            FieldValue::from(vec![employee, admin.clone(), admin]).encode(),
            json!(["employee", "admin", "admin"])
        );
        assert_eq!(
            FieldValue::from(vec![
                MultiEnumValue::from_bits(&roles, 2).unwrap(),
                MultiEnumValue::from_bits(&roles, 0).unwrap(),
            ])
            .encode(),
            json!([2, 0])
        );
    }

    #[test]
    fn test_kind_id() {
        let registry = registry();
        let admin = registry.get("app::RoleEnum", &json!("admin")).unwrap();
        assert_eq!(
            FieldValue::from(admin).kind_id().map(KindId::as_str),
            Some("app::RoleEnum")
        );
        assert_eq!(FieldValue::Cases(Vec::new()).kind_id(), None);
    }

    #[test]
    fn test_accessors() {
        let registry = registry();
        let admin = registry.get("app::RoleEnum", &json!("admin")).unwrap();
        let value = FieldValue::from(admin.clone());
        assert_eq!(value.as_single(), Some(&admin));
        assert!(value.as_multi().is_none());
        assert!(value.as_cases().is_none());
    }
}
