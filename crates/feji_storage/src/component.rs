//! Component instances and entity records.

use feji_foundation::{EntityId, KeywordId, PMap, Value};

/// Address of one field: the component that declares it plus the field name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldRef {
    /// Declaring component.
    pub component: KeywordId,
    /// Field name.
    pub field: KeywordId,
}

impl FieldRef {
    /// Creates a field address.
    #[must_use]
    pub const fn new(component: KeywordId, field: KeywordId) -> Self {
        Self { component, field }
    }
}

/// Sorted, duplicate-free set of component types.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Archetype {
    components: Vec<KeywordId>,
}

impl Archetype {
    /// Creates an empty archetype.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an archetype from any list of components.
    #[must_use]
    pub fn from_components(mut components: Vec<KeywordId>) -> Self {
        components.sort_unstable();
        components.dedup();
        Self { components }
    }

    /// Component types in ascending keyword order.
    #[must_use]
    pub fn components(&self) -> &[KeywordId] {
        &self.components
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, component: KeywordId) -> bool {
        self.components.binary_search(&component).is_ok()
    }

    /// Adds a component in place; returns false if it was already present.
    pub fn insert(&mut self, component: KeywordId) -> bool {
        match self.components.binary_search(&component) {
            Ok(_) => false,
            Err(pos) => {
                self.components.insert(pos, component);
                true
            }
        }
    }

    /// Set union.
    #[must_use]
    pub fn union(&self, other: &Archetype) -> Self {
        let mut merged = self.clone();
        for &c in &other.components {
            merged.insert(c);
        }
        merged
    }

    /// Number of component types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// One component instance: a bundle of field values.
#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    /// Component type.
    pub kind: KeywordId,
    /// Field values keyed by field name.
    pub fields: PMap<KeywordId, Value>,
}

impl Component {
    /// Creates an instance with no field values.
    #[must_use]
    pub fn new(kind: KeywordId) -> Self {
        Self {
            kind,
            fields: PMap::new(),
        }
    }

    /// Sets a field, builder style.
    #[must_use]
    pub fn with(mut self, field: KeywordId, value: impl Into<Value>) -> Self {
        self.fields.set(field, value.into());
        self
    }

    /// Reads a field.
    #[must_use]
    pub fn get(&self, field: KeywordId) -> Option<&Value> {
        self.fields.get(&field)
    }
}

/// Canonical record of one entity.
///
/// Holds at most one instance per component type. Cloning shares structure,
/// so a record snapshot costs a handful of reference-count bumps.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityRecord {
    id: EntityId,
    components: PMap<KeywordId, Component>,
}

impl EntityRecord {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            components: PMap::new(),
        }
    }

    pub(crate) fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }

    /// Id of the entity this record belongs to.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// True if the component type is attached.
    #[must_use]
    pub fn has(&self, component: KeywordId) -> bool {
        self.components.contains_key(&component)
    }

    /// Returns the attached instance of a component type.
    #[must_use]
    pub fn component(&self, component: KeywordId) -> Option<&Component> {
        self.components.get(&component)
    }

    /// Attached component types.
    #[must_use]
    pub fn archetype(&self) -> Archetype {
        Archetype::from_components(self.components.keys().copied().collect())
    }

    /// Reads a field.
    #[must_use]
    pub fn get(&self, at: FieldRef) -> Option<&Value> {
        self.components.get(&at.component)?.get(at.field)
    }

    /// Writes a field of an attached component, returning the old value.
    ///
    /// Returns `None` without writing if the component is not attached.
    pub(crate) fn set(&mut self, at: FieldRef, value: Value) -> Option<Value> {
        let mut component = self.components.get(&at.component)?.clone();
        let old = component.fields.set(at.field, value).unwrap_or(Value::Nil);
        self.components.set(at.component, component);
        Some(old)
    }

    /// Attaches a component instance. Returns false if the type was present.
    pub(crate) fn attach(&mut self, component: Component) -> bool {
        if self.has(component.kind) {
            return false;
        }
        self.components.set(component.kind, component);
        true
    }

    /// Iterates over attached instances in unspecified order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().map(|(_, c)| c)
    }
}
