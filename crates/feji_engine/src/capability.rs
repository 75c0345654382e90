//! Capability casts: narrowing an entity reference to one component.
//!
//! A cast never copies data. It checks that the entity carries the
//! component and hands back a [`ComponentHandle`], which is just the entity
//! id and the component type. Every read and write through a handle goes to
//! the world's single record for the entity, so all handles on one entity
//! observe each other's writes immediately.

use feji_foundation::{EntityId, Error, KeywordId, Result, Value};
use feji_storage::{ComponentTable, EntityStore, FieldRef};

use crate::world::World;

/// An entity reference, optionally already narrowed to a component.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityRef {
    /// The referenced entity.
    pub entity: EntityId,
    /// Component the reference was narrowed to, if any.
    pub component: Option<KeywordId>,
}

impl EntityRef {
    /// A plain reference.
    #[must_use]
    pub const fn new(entity: EntityId) -> Self {
        Self {
            entity,
            component: None,
        }
    }

    /// A reference narrowed to `component`.
    #[must_use]
    pub const fn narrowed(entity: EntityId, component: KeywordId) -> Self {
        Self {
            entity,
            component: Some(component),
        }
    }
}

impl From<EntityId> for EntityRef {
    fn from(entity: EntityId) -> Self {
        Self::new(entity)
    }
}

impl From<ComponentHandle> for EntityRef {
    fn from(handle: ComponentHandle) -> Self {
        Self::narrowed(handle.entity, handle.component)
    }
}

/// Decides casts against the current world state.
#[derive(Clone, Copy, Debug)]
pub struct CapabilityRegistry<'w> {
    table: &'w ComponentTable,
    store: &'w EntityStore,
}

impl<'w> CapabilityRegistry<'w> {
    /// Creates a registry over a table and store.
    #[must_use]
    pub fn new(table: &'w ComponentTable, store: &'w EntityStore) -> Self {
        Self { table, store }
    }

    /// True if the entity's composition set includes `component`.
    ///
    /// # Errors
    ///
    /// Fails for dead references and unregistered components.
    pub fn provides(&self, entity: EntityId, component: KeywordId) -> Result<bool> {
        if !self.table.contains(component) {
            return Err(Error::unknown_component(self.table.name(component)));
        }
        // Attaching a component attaches everything it embeds, so presence
        // on the record is presence in the composition set.
        Ok(self.store.get(entity)?.has(component))
    }

    /// Narrows `reference` to `component`.
    ///
    /// A missing component is an ordinary outcome and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Fails for dead references and unregistered components.
    pub fn cast(&self, reference: EntityRef, component: KeywordId) -> Result<Option<ComponentHandle>> {
        let handle = self
            .provides(reference.entity, component)?
            .then_some(ComponentHandle {
                entity: reference.entity,
                component,
            });
        tracing::trace!(
            entity = ?reference.entity,
            component = %self.table.name(component),
            hit = handle.is_some(),
            "cast"
        );
        Ok(handle)
    }
}

/// Aliasing handle to one component of one entity.
///
/// Field names resolve through the component's composition set, so a
/// `pickaxe` handle reaches the `item` fields it embeds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentHandle {
    entity: EntityId,
    component: KeywordId,
}

impl ComponentHandle {
    /// The entity behind the handle.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// The component the handle is narrowed to.
    #[must_use]
    pub const fn component(&self) -> KeywordId {
        self.component
    }

    /// Resolves a field name to the address it reads and writes.
    ///
    /// # Errors
    ///
    /// Fails if no member of the composition set declares the field.
    pub fn field(&self, world: &World, field: KeywordId) -> Result<FieldRef> {
        world.table().resolve_field(self.component, field)
    }

    /// Reads a field.
    ///
    /// # Errors
    ///
    /// Fails for destroyed entities and unknown fields.
    pub fn get(&self, world: &World, field: KeywordId) -> Result<Value> {
        let at = self.field(world, field)?;
        world.read(self.entity, at)
    }

    /// Reads a field by name.
    ///
    /// # Errors
    ///
    /// See [`ComponentHandle::get`].
    pub fn get_named(&self, world: &World, field: &str) -> Result<Value> {
        let id = world.keyword(field).ok_or_else(|| {
            Error::attribute_not_found(world.table().name(self.component), field)
        })?;
        self.get(world, id)
    }

    /// Writes a field and recomputes everything derived from it.
    ///
    /// # Errors
    ///
    /// Fails for destroyed entities, unknown or derived fields, type
    /// mismatches and failing recomputes; nothing is written on failure.
    pub fn set(&self, world: &mut World, field: KeywordId, value: impl Into<Value>) -> Result<()> {
        let at = self.field(world, field)?;
        world.set_field(self.entity, at, value.into())
    }

    /// Writes a field by name.
    ///
    /// # Errors
    ///
    /// See [`ComponentHandle::set`].
    pub fn set_named(&self, world: &mut World, field: &str, value: impl Into<Value>) -> Result<()> {
        let id = world.keyword(field).ok_or_else(|| {
            Error::attribute_not_found(world.table().name(self.component), field)
        })?;
        self.set(world, id, value)
    }
}
