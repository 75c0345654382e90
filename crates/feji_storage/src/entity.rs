//! Entity records with generational ids.
//!
//! The `EntityStore` is the single owner of every entity record. Ids carry
//! the generation of their slot, so an id that outlives its entity is
//! detected instead of silently addressing whatever reused the slot.

use feji_foundation::{EntityId, Error, ErrorKind, Result, Value};

use crate::component::{Component, EntityRecord, FieldRef};

struct Slot {
    /// Odd while alive, even while free.
    generation: u32,
    record: Option<EntityRecord>,
}

/// Owns all entity records.
#[derive(Default)]
pub struct EntityStore {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live: usize,
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("slots", &self.slots.len())
            .field("live", &self.live)
            .finish()
    }
}

impl EntityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an entity from a set of component instances.
    ///
    /// # Errors
    ///
    /// Fails if two instances share a component type, or every `u32` slot
    /// index is taken; nothing is allocated.
    pub fn spawn(&mut self, components: Vec<Component>) -> Result<EntityId> {
        let mut record = EntityRecord::new(EntityId::new(0, 0));
        for component in components {
            let kind = component.kind;
            if !record.attach(component) {
                return Err(Error::new(ErrorKind::DuplicateComponent(
                    format!("{kind:?}"),
                )));
            }
        }

        let id = if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation += 1;
            EntityId::new(index, slot.generation)
        } else {
            let index = u32::try_from(self.slots.len())
                .map_err(|_| Error::new(ErrorKind::Internal("entity slots exhausted".to_string())))?;
            self.slots.push(Slot {
                generation: 1,
                record: None,
            });
            EntityId::new(index, 1)
        };

        self.slots[id.index as usize].record = Some(record.with_id(id));
        self.live += 1;
        tracing::debug!(entity = ?id, "spawned entity");
        Ok(id)
    }

    /// Checks that an id addresses a live entity.
    ///
    /// # Errors
    ///
    /// `EntityNotFound` for ids never issued, `StaleEntity` for ids whose
    /// entity was destroyed.
    pub fn validate(&self, id: EntityId) -> Result<()> {
        let Some(slot) = self.slots.get(id.index as usize) else {
            return Err(Error::entity_not_found(id));
        };
        // Live generations are odd; an even or future generation was never issued.
        if id.generation % 2 == 0 || id.generation > slot.generation {
            return Err(Error::entity_not_found(id));
        }
        if slot.generation != id.generation {
            return Err(Error::stale_entity(id));
        }
        Ok(())
    }

    /// True if the id addresses a live entity.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.validate(id).is_ok()
    }

    /// Returns the record of a live entity.
    ///
    /// # Errors
    ///
    /// See [`EntityStore::validate`].
    pub fn get(&self, id: EntityId) -> Result<&EntityRecord> {
        self.validate(id)?;
        self.slots[id.index as usize]
            .record
            .as_ref()
            .ok_or_else(|| Error::stale_entity(id))
    }

    /// Writes a field of a live entity, returning the previous value.
    ///
    /// No type checking happens here; see `ComponentTable::check_write`.
    ///
    /// # Errors
    ///
    /// Fails for dead ids and components the entity does not carry.
    pub fn write(&mut self, id: EntityId, at: FieldRef, value: Value) -> Result<Value> {
        self.validate(id)?;
        let record = self.slots[id.index as usize]
            .record
            .as_mut()
            .ok_or_else(|| Error::stale_entity(id))?;
        record
            .set(at, value)
            .ok_or_else(|| Error::component_not_found(id, format!("{:?}", at.component)))
    }

    /// Attaches more component instances to a live entity.
    ///
    /// # Errors
    ///
    /// Fails for dead ids or if any type is already attached; in that case
    /// the record is unchanged.
    pub fn attach(&mut self, id: EntityId, components: Vec<Component>) -> Result<()> {
        self.validate(id)?;
        let slot = &mut self.slots[id.index as usize];
        let Some(record) = slot.record.as_mut() else {
            return Err(Error::stale_entity(id));
        };
        let mut updated = record.clone();
        for component in components {
            let kind = component.kind;
            if !updated.attach(component) {
                return Err(Error::new(ErrorKind::DuplicateComponent(
                    format!("{kind:?}"),
                )));
            }
        }
        *record = updated;
        Ok(())
    }

    /// Clones a live entity's record.
    ///
    /// # Errors
    ///
    /// See [`EntityStore::validate`].
    pub fn snapshot(&self, id: EntityId) -> Result<EntityRecord> {
        self.get(id).cloned()
    }

    /// Puts back a record taken with [`EntityStore::snapshot`].
    ///
    /// # Errors
    ///
    /// Fails if the entity was destroyed since, or the record belongs to a
    /// different entity.
    pub fn restore(&mut self, record: EntityRecord) -> Result<()> {
        let id = record.id();
        self.validate(id)?;
        self.slots[id.index as usize].record = Some(record);
        Ok(())
    }

    /// Destroys an entity, returning its final record.
    ///
    /// Every id issued for it becomes stale.
    ///
    /// # Errors
    ///
    /// See [`EntityStore::validate`].
    pub fn destroy(&mut self, id: EntityId) -> Result<EntityRecord> {
        self.validate(id)?;
        let slot = &mut self.slots[id.index as usize];
        slot.generation += 1;
        let record = slot.record.take().ok_or_else(|| Error::stale_entity(id))?;
        self.free_list.push(id.index);
        self.live -= 1;
        tracing::debug!(entity = ?id, "destroyed entity");
        Ok(record)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// True when no entity is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterates over live entity ids in slot order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots
            .iter()
            .filter_map(|slot| slot.record.as_ref().map(EntityRecord::id))
    }
}
