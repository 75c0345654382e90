//! Error types for the Feji runtime.
//!
//! Uses `thiserror` for the categorized [`ErrorKind`]; [`Error`] adds optional
//! context describing where the failure surfaced (plugin, handler, binding).

use std::fmt;

use thiserror::Error;

use crate::entity::EntityId;
use crate::types::Type;

/// The main error type for Feji operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Where it went wrong, when known.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates an error of the given kind without context.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Attaches context, replacing any existing context.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto the context stack, creating the context if needed.
    #[must_use]
    pub fn in_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// The entity id was never issued.
    #[must_use]
    pub fn entity_not_found(id: EntityId) -> Self {
        Self::new(ErrorKind::EntityNotFound(id))
    }

    /// The entity behind this id has been destroyed.
    #[must_use]
    pub fn stale_entity(id: EntityId) -> Self {
        Self::new(ErrorKind::StaleEntity(id))
    }

    /// No schema is registered under this component name.
    #[must_use]
    pub fn unknown_component(component: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownComponent(component.into()))
    }

    /// The entity does not carry the component.
    #[must_use]
    pub fn component_not_found(entity: EntityId, component: impl Into<String>) -> Self {
        Self::new(ErrorKind::ComponentNotFound {
            entity,
            component: component.into(),
        })
    }

    /// The component (and everything it embeds) has no such field.
    #[must_use]
    pub fn attribute_not_found(component: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::new(ErrorKind::AttributeNotFound {
            component: component.into(),
            attribute: attribute.into(),
        })
    }

    /// A field write did not match the declared type.
    #[must_use]
    pub fn type_mismatch(field: impl Into<String>, expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        })
    }

    /// Registering a binding would close a dependency cycle.
    #[must_use]
    pub fn binding_cycle(entity: EntityId, path: Vec<String>) -> Self {
        Self::new(ErrorKind::BindingCycle { entity, path })
    }

    /// A lookup table has no entry for the key.
    #[must_use]
    pub fn missing_key(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingKey {
            table: table.into(),
            key: key.into(),
        })
    }

    /// A template could not be rendered.
    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format(message.into()))
    }

    /// A collaborator was called with arguments it cannot honor.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument(message.into()))
    }

    /// A configured limit was hit.
    #[must_use]
    pub fn limit_exceeded(limit: Limit) -> Self {
        Self::new(ErrorKind::LimitExceeded(limit))
    }

    /// Returns true for errors caused by addressing a dead or unknown entity.
    #[must_use]
    pub fn is_dead_reference(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::EntityNotFound(_) | ErrorKind::StaleEntity(_)
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A field write did not match the schema.
    #[error("type mismatch on {field}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Field that was written.
        field: String,
        /// Declared type.
        expected: Type,
        /// Type of the rejected value.
        actual: Type,
    },

    /// The entity id was never issued by this store.
    #[error("entity not found: {0:?}")]
    EntityNotFound(EntityId),

    /// The entity was destroyed; the reference outlived it.
    #[error("use of destroyed entity: {0:?}")]
    StaleEntity(EntityId),

    /// No component schema with this name.
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    /// A component type was registered twice, or attached to an entity
    /// that already carries it.
    #[error("duplicate component: {0}")]
    DuplicateComponent(String),

    /// The entity does not have the component.
    #[error("component {component} not present on entity {entity:?}")]
    ComponentNotFound {
        /// Entity that was addressed.
        entity: EntityId,
        /// Missing component.
        component: String,
    },

    /// The component has no field with this name.
    #[error("field {attribute} not found on component {component}")]
    AttributeNotFound {
        /// Component that was addressed.
        component: String,
        /// Missing field.
        attribute: String,
    },

    /// An unqualified field name matches fields on several components.
    #[error("field {field} is ambiguous between {}", components.join(", "))]
    AmbiguousField {
        /// Unqualified field name.
        field: String,
        /// Components declaring it.
        components: Vec<String>,
    },

    /// A binding would make a derived field depend on itself.
    #[error("binding cycle on entity {entity:?}: {}", path.join(" -> "))]
    BindingCycle {
        /// Entity whose binding graph was being extended.
        entity: EntityId,
        /// Fields along the cycle, starting and ending with the new target.
        path: Vec<String>,
    },

    /// Derived fields are written by their binding only.
    #[error("field {field} on entity {entity:?} is derived and cannot be written directly")]
    DerivedFieldWrite {
        /// Entity that was addressed.
        entity: EntityId,
        /// Derived field.
        field: String,
    },

    /// A lookup table has no entry for the key.
    #[error("no entry for {key:?} in {table}")]
    MissingKey {
        /// Table name.
        table: String,
        /// Requested key.
        key: String,
    },

    /// Template rendering failed.
    #[error("format error: {0}")]
    Format(String),

    /// A collaborator was called with arguments it cannot honor.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An event was published while a dispatch of the same kind was running.
    #[error("re-entrant publication of event {0}")]
    ReentrantPublish(String),

    /// A configured limit was exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(Limit),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// Broken internal invariant.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Limits that keep every operation bounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Limit {
    /// Too many bindings on one entity.
    BindingsPerEntity {
        /// Configured maximum.
        limit: usize,
    },
    /// Too many nested event dispatches.
    DispatchDepth {
        /// Configured maximum.
        limit: usize,
    },
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BindingsPerEntity { limit } => write!(f, "more than {limit} bindings on entity"),
            Self::DispatchDepth { limit } => write!(f, "event dispatch nested deeper than {limit}"),
        }
    }
}

/// Where an error surfaced.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Plugin or script that was running.
    pub source: Option<String>,
    /// Innermost frame last.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "in {source}")?;
        }
        for frame in self.stack.iter().rev() {
            write!(f, "\n  at {frame}")?;
        }
        Ok(())
    }
}
