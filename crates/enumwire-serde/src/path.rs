//! # Paths
//!
//! A [`Path`] is the position of a field inside the object graph, threaded
//! explicitly through every recursive call. It renders two ways:
//!
//! - [`Path::field_path`]: serialized names joined by dots, indices in
//!   brackets (`embedded_object.single_enum`, `array_of_single_enums[1]`).
//!   Used for deserialization errors, where the document is what the caller
//!   knows.
//! - [`Path::property_path`]: the root class followed by `::$property`
//!   segments (`User::$embeddedObject::$multiEnum`). Used for serialization
//!   errors, where the object graph is what the caller knows.

use std::fmt::Write as _;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A named property.
    Property {
        /// In-memory property name.
        name: String,
        /// Name used in serialized documents.
        serialized_name: String,
    },
    /// An element of an array-shaped field.
    Index(usize),
}

/// Position of a value relative to the root object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    root: String,
    segments: Vec<Segment>,
}

impl Path {
    /// The root object of class `class`.
    pub fn root(class: impl Into<String>) -> Self {
        Self {
            root: class.into(),
            segments: Vec::new(),
        }
    }

    /// This path extended by a property.
    pub fn property(&self, name: impl Into<String>, serialized_name: impl Into<String>) -> Self {
        self.with(Segment::Property {
            name: name.into(),
            serialized_name: serialized_name.into(),
        })
    }

    /// This path extended by an array index.
    pub fn index(&self, index: usize) -> Self {
        self.with(Segment::Index(index))
    }

    fn with(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self {
            root: self.root.clone(),
            segments,
        }
    }

    /// Class name of the root object.
    pub fn root_class(&self) -> &str {
        &self.root
    }

    /// Segments after the root.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether this is the root itself.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Dotted serialized-name rendering. Empty at the root.
    pub fn field_path(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Property {
                    serialized_name, ..
                } => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(serialized_name);
                }
                Segment::Index(i) => {
                    let _ = write!(out, "[{i}]");
                }
            }
        }
        out
    }

    /// `Root::$a::$b` rendering.
    pub fn property_path(&self) -> String {
        let mut out = self.root.clone();
        for segment in &self.segments {
            match segment {
                Segment::Property { name, .. } => {
                    let _ = write!(out, "::${name}");
                }
                Segment::Index(i) => {
                    let _ = write!(out, "[{i}]");
                }
            }
        }
        out
    }
}
