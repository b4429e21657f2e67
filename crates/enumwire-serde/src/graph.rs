//! # Object Graph Walker
//!
//! A small host serializer for objects described by [`ClassMetadata`]. It
//! visits properties in declaration order, recurses into nested objects,
//! threads a [`Path`] through every call, and hands enum-typed properties to
//! the [`EnumHandler`].
//!
//! Serialized names come from a camelCase → snake_case naming strategy
//! unless a property overrides them. Absent and `null` properties are
//! skipped in both directions.
//!
//! Class metadata deserializes from YAML or JSON:
//!
//! ```yaml
//! name: User
//! properties:
//!   - name: singleEnum
//!     kind: { enum: "enum<app::RoleEnum>" }
//!   - name: embeddedObject
//!     kind: { object: User }
//!   - name: nickname
//!     kind: plain
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use enumwire_core::{EnumLookup, EnumRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::HandlerError;
use crate::handler::EnumHandler;
use crate::path::Path;
use crate::shape::FieldShape;
use crate::value::FieldValue;

/// Failure while walking an object graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// An enum-typed property failed to convert.
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// No metadata is registered for the class.
    #[error("no metadata registered for class {0}")]
    UnknownClass(String),

    /// A nested object was expected in the document.
    #[error("expected an object at {field_path:?}, got {value}")]
    NotAnObject {
        /// Dotted field path; empty for the root.
        field_path: String,
        /// The raw value found instead.
        value: Value,
    },

    /// An in-memory property value does not match its declared kind.
    #[error("property {property_path} holds a value of the wrong kind")]
    PropertyTypeMismatch {
        /// `Root::$a::$b` chain.
        property_path: String,
    },
}

/// How a property is converted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// Converted by the enum handler.
    Enum(FieldShape),
    /// A nested object of the named class.
    Object(String),
    /// Copied through unchanged.
    Plain,
}

/// One property of a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    /// In-memory property name.
    pub name: String,
    /// Name in serialized documents; derived from `name` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialized_name: Option<String>,
    /// How the property is converted.
    pub kind: PropertyKind,
}

impl PropertyMetadata {
    /// The explicit serialized name, or `name` in snake_case.
    pub fn serialized_name(&self) -> String {
        self.serialized_name
            .clone()
            .unwrap_or_else(|| snake_case(&self.name))
    }
}

/// Properties of a class, in visiting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetadata {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<PropertyMetadata>,
}

impl ClassMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Add an enum-typed property.
    pub fn enum_property(self, name: impl Into<String>, shape: FieldShape) -> Self {
        self.property(name, PropertyKind::Enum(shape))
    }

    /// Add a nested-object property.
    pub fn object_property(self, name: impl Into<String>, class: impl Into<String>) -> Self {
        self.property(name, PropertyKind::Object(class.into()))
    }

    /// Add a property copied through unchanged.
    pub fn plain_property(self, name: impl Into<String>) -> Self {
        self.property(name, PropertyKind::Plain)
    }

    fn property(mut self, name: impl Into<String>, kind: PropertyKind) -> Self {
        self.properties.push(PropertyMetadata {
            name: name.into(),
            serialized_name: None,
            kind,
        });
        self
    }
}

/// An in-memory object.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Class name, used to find metadata.
    pub class: String,
    /// Property values by in-memory name. Missing entries are absent.
    pub values: BTreeMap<String, PropertyValue>,
}

impl Object {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            values: BTreeMap::new(),
        }
    }

    /// Builder-style [`Object::set`].
    pub fn with(mut self, property: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set(property, value);
        self
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<PropertyValue>) {
        self.values.insert(property.into(), value.into());
    }

    pub fn get(&self, property: &str) -> Option<&PropertyValue> {
        self.values.get(property)
    }

    /// The enum value of `property`, if it holds one.
    pub fn enum_value(&self, property: &str) -> Option<&FieldValue> {
        match self.values.get(property) {
            Some(PropertyValue::Enum(value)) => Some(value),
            _ => None,
        }
    }

    /// The nested object of `property`, if it holds one.
    pub fn object(&self, property: &str) -> Option<&Object> {
        match self.values.get(property) {
            Some(PropertyValue::Object(object)) => Some(object),
            _ => None,
        }
    }
}

/// Value of one property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Enum(FieldValue),
    Object(Object),
    Plain(Value),
}

impl From<FieldValue> for PropertyValue {
    fn from(value: FieldValue) -> Self {
        Self::Enum(value)
    }
}

impl From<Object> for PropertyValue {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        Self::Plain(value)
    }
}

/// camelCase → snake_case: every uppercase letter after the first character
/// starts a new word.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

/// Serializes and deserializes objects of registered classes.
#[derive(Debug)]
pub struct ObjectGraph<L: EnumLookup + ?Sized = EnumRegistry> {
    handler: EnumHandler<L>,
    classes: HashMap<String, ClassMetadata>,
}

impl<L: EnumLookup + ?Sized> ObjectGraph<L> {
    pub fn new(lookup: Arc<L>) -> Self {
        Self::with_handler(EnumHandler::new(lookup))
    }

    pub fn with_handler(handler: EnumHandler<L>) -> Self {
        Self {
            handler,
            classes: HashMap::new(),
        }
    }

    /// Register (or replace) the metadata of a class.
    pub fn register_class(&mut self, class: ClassMetadata) {
        tracing::debug!(
            class = %class.name,
            properties = class.properties.len(),
            "registered class metadata"
        );
        self.classes.insert(class.name.clone(), class);
    }

    pub fn handler(&self) -> &EnumHandler<L> {
        &self.handler
    }

    fn class(&self, name: &str) -> Result<&ClassMetadata, GraphError> {
        self.classes
            .get(name)
            .ok_or_else(|| GraphError::UnknownClass(name.to_string()))
    }

    /// Serialize `object` to a JSON document.
    pub fn serialize(&self, object: &Object) -> Result<Value, GraphError> {
        self.serialize_object(object, &Path::root(&object.class))
    }

    fn serialize_object(&self, object: &Object, path: &Path) -> Result<Value, GraphError> {
        let class = self.class(&object.class)?;
        let mut out = Map::new();

        for property in &class.properties {
            let Some(value) = object.values.get(&property.name) else {
                continue;
            };
            if matches!(value, PropertyValue::Plain(Value::Null)) {
                continue;
            }
            let serialized_name = property.serialized_name();
            let path = path.property(&property.name, &serialized_name);

            let encoded = match (&property.kind, value) {
                (PropertyKind::Enum(shape), PropertyValue::Enum(field)) => {
                    self.handler.serialize_field(shape, field, &path)?
                }
                (PropertyKind::Object(_), PropertyValue::Object(nested)) => {
                    self.serialize_object(nested, &path)?
                }
                (PropertyKind::Plain, PropertyValue::Plain(raw)) => raw.clone(),
                _ => {
                    return Err(GraphError::PropertyTypeMismatch {
                        property_path: path.property_path(),
                    })
                }
            };
            out.insert(serialized_name, encoded);
        }
        Ok(Value::Object(out))
    }

    /// Deserialize a JSON document into an object of class `class`.
    pub fn deserialize(&self, class: &str, document: &Value) -> Result<Object, GraphError> {
        self.deserialize_object(class, document, &Path::root(class))
    }

    fn deserialize_object(&self, class: &str, document: &Value, path: &Path) -> Result<Object, GraphError> {
        let metadata = self.class(class)?;
        let Value::Object(fields) = document else {
            return Err(GraphError::NotAnObject {
                field_path: path.field_path(),
                value: document.clone(),
            });
        };
        let mut object = Object::new(class);

        for property in &metadata.properties {
            let serialized_name = property.serialized_name();
            let raw = match fields.get(&serialized_name) {
                None | Some(Value::Null) => continue,
                Some(raw) => raw,
            };
            let path = path.property(&property.name, &serialized_name);

            let value = match &property.kind {
                PropertyKind::Enum(shape) => {
                    PropertyValue::Enum(self.handler.deserialize_field(shape, raw, &path)?)
                }
                PropertyKind::Object(nested) => {
                    PropertyValue::Object(self.deserialize_object(nested, raw, &path)?)
                }
                PropertyKind::Plain => PropertyValue::Plain(raw.clone()),
            };
            object.values.insert(property.name.clone(), value);
        }
        Ok(object)
    }
}
