//! Payload of a runtime value.

use std::fmt;

use super::{Instance, Memory};

/// The value stored inside a [`Memory`] cell.
///
/// Arrays hold `Memory` handles rather than plain payloads so that an element
/// can itself be passed by reference. Cloning a `Dynamic` is shallow: array
/// elements are shared, not copied. Use [`Memory::mutable_copy`] or
/// [`Memory::immutable_copy`] for value semantics.
#[derive(Clone, Default)]
pub enum Dynamic {
    /// Absent value.
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (every native integer width is stored as i64)
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value (owned)
    String(String),
    /// Ordered list of values
    Array(Vec<Memory>),
    /// Object instance
    Object(Instance),
}

impl Dynamic {
    /// Get a human-readable name for this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Int(_) => "int",
            Dynamic::Float(_) => "float",
            Dynamic::String(_) => "string",
            Dynamic::Array(_) => "array",
            Dynamic::Object(_) => "object",
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    /// Copy the payload, giving every nested array element its own cell.
    pub(crate) fn deep_copy(&self, immutable: bool) -> Dynamic {
        match self {
            Dynamic::Array(items) => Dynamic::Array(
                items
                    .iter()
                    .map(|item| {
                        if immutable {
                            item.immutable_copy()
                        } else {
                            item.mutable_copy()
                        }
                    })
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Null => write!(f, "Null"),
            Dynamic::Bool(v) => write!(f, "Bool({})", v),
            Dynamic::Int(v) => write!(f, "Int({})", v),
            Dynamic::Float(v) => write!(f, "Float({})", v),
            Dynamic::String(s) => write!(f, "String({:?})", s),
            Dynamic::Array(items) => f.debug_list().entries(items.iter()).finish(),
            Dynamic::Object(obj) => write!(f, "Object({})", obj.class_name()),
        }
    }
}

impl PartialEq for Dynamic {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Dynamic::Null, Dynamic::Null) => true,
            (Dynamic::Bool(a), Dynamic::Bool(b)) => a == b,
            (Dynamic::Int(a), Dynamic::Int(b)) => a == b,
            (Dynamic::Float(a), Dynamic::Float(b)) => a == b,
            (Dynamic::String(a), Dynamic::String(b)) => a == b,
            (Dynamic::Array(a), Dynamic::Array(b)) => a == b,
            // Objects compare by identity
            (Dynamic::Object(a), Dynamic::Object(b)) => Instance::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Dynamic {
    fn from(v: bool) -> Self {
        Dynamic::Bool(v)
    }
}

impl From<i64> for Dynamic {
    fn from(v: i64) -> Self {
        Dynamic::Int(v)
    }
}

impl From<f64> for Dynamic {
    fn from(v: f64) -> Self {
        Dynamic::Float(v)
    }
}

impl From<&str> for Dynamic {
    fn from(v: &str) -> Self {
        Dynamic::String(v.to_string())
    }
}

impl From<String> for Dynamic {
    fn from(v: String) -> Self {
        Dynamic::String(v)
    }
}

impl From<Vec<Memory>> for Dynamic {
    fn from(v: Vec<Memory>) -> Self {
        Dynamic::Array(v)
    }
}

impl From<Instance> for Dynamic {
    fn from(v: Instance) -> Self {
        Dynamic::Object(v)
    }
}
