//! Schema definitions for component types.

use feji_foundation::{KeywordId, Type, Value};

/// Declaration of a component type.
///
/// `requires` lists the component types this one embeds. Creating or
/// attaching the component also attaches everything it requires, and a
/// handle narrowed to it can reach the embedded fields.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentSchema {
    /// Component name (e.g. `pickaxe`).
    pub name: KeywordId,
    /// Fields declared directly on this component.
    pub fields: Vec<FieldSchema>,
    /// Embedded component types.
    pub requires: Vec<KeywordId>,
}

impl ComponentSchema {
    /// Creates a schema with no fields.
    #[must_use]
    pub fn new(name: KeywordId) -> Self {
        Self {
            name,
            fields: Vec::new(),
            requires: Vec::new(),
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Embeds another component type.
    #[must_use]
    pub fn embedding(mut self, component: KeywordId) -> Self {
        if !self.requires.contains(&component) {
            self.requires.push(component);
        }
        self
    }

    /// Returns the field schema by name.
    #[must_use]
    pub fn field(&self, name: KeywordId) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Declaration of one component field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSchema {
    /// Field name.
    pub name: KeywordId,
    /// Declared type.
    pub ty: Type,
    /// Value used when the constructor does not supply one.
    pub default: Option<Value>,
    /// Whether the constructor must supply a value.
    pub required: bool,
}

impl FieldSchema {
    /// A field the constructor must set.
    #[must_use]
    pub fn required(name: KeywordId, ty: Type) -> Self {
        Self {
            name,
            ty,
            default: None,
            required: true,
        }
    }

    /// A field with a default value.
    #[must_use]
    pub fn optional(name: KeywordId, ty: Type, default: impl Into<Value>) -> Self {
        Self {
            name,
            ty,
            default: Some(default.into()),
            required: false,
        }
    }

    /// A field that starts out `nil`.
    #[must_use]
    pub fn optional_nil(name: KeywordId, ty: Type) -> Self {
        Self {
            name,
            ty: if ty.is_nullable() { ty } else { Type::option(ty) },
            default: None,
            required: false,
        }
    }

    /// Initial value when the constructor supplies none.
    #[must_use]
    pub fn initial_value(&self) -> Value {
        self.default.clone().unwrap_or(Value::Nil)
    }
}
