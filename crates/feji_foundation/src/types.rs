//! Field type descriptors.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Declared type of a component field.
///
/// Only used to validate writes; there is no static checking.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    /// Only `nil`.
    Nil,
    /// Boolean.
    Bool,
    /// Integer.
    Int,
    /// Float. Also accepts integers.
    Float,
    /// Text.
    String,
    /// Entity reference.
    EntityRef,
    /// List with the given element type.
    Vec(Box<Type>),
    /// The inner type or `nil`.
    Option(Box<Type>),
    /// Anything.
    Any,
}

impl Type {
    /// List type.
    #[must_use]
    pub fn vec(element: Type) -> Self {
        Self::Vec(Box::new(element))
    }

    /// Optional type.
    #[must_use]
    pub fn option(inner: Type) -> Self {
        Self::Option(Box::new(inner))
    }

    /// Returns true for `Any`.
    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Returns true if `nil` is an acceptable value.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(self, Self::Nil | Self::Option(_) | Self::Any)
    }

    /// Returns true if a value of type `actual` may be stored in a field
    /// declared as `self`.
    ///
    /// Runtime lists report an `Any` element type, which every list
    /// declaration accepts.
    #[must_use]
    pub fn accepts(&self, actual: &Type) -> bool {
        match (self, actual) {
            (Self::Any, _) => true,
            (Self::Option(inner), actual) => matches!(actual, Self::Nil) || inner.accepts(actual),
            (Self::Nil, Self::Nil)
            | (Self::Bool, Self::Bool)
            | (Self::Int | Self::Float, Self::Int)
            | (Self::Float, Self::Float)
            | (Self::String, Self::String)
            | (Self::EntityRef, Self::EntityRef) => true,
            (Self::Vec(expected), Self::Vec(elem)) => elem.is_any() || expected.accepts(elem),
            _ => false,
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "txt"),
            Self::EntityRef => write!(f, "entity-ref"),
            Self::Vec(t) => write!(f, "vec<{t:?}>"),
            Self::Option(t) => write!(f, "option<{t:?}>"),
            Self::Any => write!(f, "any"),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
