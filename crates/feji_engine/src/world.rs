//! The world: component table, entity records and bindings in one place.
//!
//! Every field write goes through [`World::set_fields`]. It snapshots the
//! entity record, applies the writes, reruns every affected binding in
//! dependency order, and puts the snapshot back if anything fails. Callers
//! therefore see either the whole update, derived fields included, or none
//! of it.

use std::collections::HashMap;

use feji_foundation::{EntityId, Error, ErrorKind, KeywordId, Limit, Result, Value};
use feji_storage::{
    ComponentSchema, ComponentTable, EntityRecord, EntityStore, EntityView, FieldRef,
};

use crate::binding::Binding;
use crate::capability::{CapabilityRegistry, ComponentHandle, EntityRef};
use crate::config::WorldConfig;
use crate::graph::BindingGraph;

/// Owner of all entity state.
#[derive(Debug, Default)]
pub struct World {
    table: ComponentTable,
    store: EntityStore,
    bindings: HashMap<EntityId, BindingGraph>,
    config: WorldConfig,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Active limits.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The component table.
    #[must_use]
    pub fn table(&self) -> &ComponentTable {
        &self.table
    }

    /// Interns a name.
    pub fn intern(&mut self, name: &str) -> KeywordId {
        self.table.intern(name)
    }

    /// Looks up an already interned name.
    #[must_use]
    pub fn keyword(&self, name: &str) -> Option<KeywordId> {
        self.table.interner().lookup(name)
    }

    /// Text of a keyword.
    #[must_use]
    pub fn name(&self, id: KeywordId) -> String {
        self.table.name(id)
    }

    /// Registers a component type.
    ///
    /// # Errors
    ///
    /// See [`ComponentTable::register`].
    pub fn register_component(&mut self, schema: ComponentSchema) -> Result<()> {
        self.table.register(schema)
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity carrying `component` and everything it embeds.
    ///
    /// `overrides` set fields by name; the rest take their schema defaults.
    ///
    /// # Errors
    ///
    /// Fails on unknown components or fields, type mismatches and missing
    /// required fields. Nothing is created on failure.
    pub fn create(&mut self, component: KeywordId, overrides: &[(KeywordId, Value)]) -> Result<EntityId> {
        let instances = self
            .table
            .instantiate(component, overrides, &feji_storage::Archetype::new())?;
        let id = self.store.spawn(instances)?;
        tracing::debug!(entity = ?id, component = %self.table.name(component), "created entity");
        Ok(id)
    }

    /// Attaches `component` (and whatever it embeds that is not present yet)
    /// to a live entity.
    ///
    /// # Errors
    ///
    /// Fails for dead entities, components already attached, and the
    /// constructor errors of [`World::create`].
    pub fn attach(
        &mut self,
        entity: EntityId,
        component: KeywordId,
        overrides: &[(KeywordId, Value)],
    ) -> Result<()> {
        let present = self.store.get(entity)?.archetype();
        let instances = self.table.instantiate(component, overrides, &present)?;
        self.store.attach(entity, instances)
    }

    /// True if the id addresses a live entity.
    #[must_use]
    pub fn exists(&self, entity: EntityId) -> bool {
        self.store.exists(entity)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True when no entity is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Live entity ids.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.store.iter()
    }

    /// A read-only view of a live entity.
    ///
    /// # Errors
    ///
    /// `EntityNotFound` or `StaleEntity` for dead ids.
    pub fn get(&self, entity: EntityId) -> Result<EntityView<'_>> {
        Ok(EntityView::new(self.store.get(entity)?, &self.table))
    }

    /// Reads one field.
    ///
    /// # Errors
    ///
    /// Fails for dead ids, missing components and unknown fields.
    pub fn read(&self, entity: EntityId, at: FieldRef) -> Result<Value> {
        self.get(entity)?.get(at).cloned()
    }

    /// Writes one field; see [`World::set_fields`].
    ///
    /// # Errors
    ///
    /// See [`World::set_fields`].
    pub fn set_field(&mut self, entity: EntityId, at: FieldRef, value: Value) -> Result<()> {
        self.set_fields(entity, &[(at, value)])
    }

    /// Writes several fields of one entity as a single step.
    ///
    /// Every binding that depends on a written field, directly or through
    /// other bindings, is recomputed before this returns.
    ///
    /// # Errors
    ///
    /// Fails for dead ids, missing components, unknown or derived fields,
    /// type mismatches, and failing recomputes. On failure the entity is
    /// left exactly as it was.
    pub fn set_fields(&mut self, entity: EntityId, writes: &[(FieldRef, Value)]) -> Result<()> {
        let snapshot = self.store.snapshot(entity)?;
        let result = self.apply_writes(entity, writes);
        if result.is_err() {
            self.store.restore(snapshot)?;
        }
        result
    }

    fn apply_writes(&mut self, entity: EntityId, writes: &[(FieldRef, Value)]) -> Result<()> {
        let graph = self.bindings.get(&entity);
        for (at, value) in writes {
            if !self.store.get(entity)?.has(at.component) {
                return Err(Error::component_not_found(entity, self.table.name(at.component)));
            }
            self.table.check_write(*at, value)?;
            if graph.is_some_and(|g| g.is_derived(*at)) {
                return Err(Error::new(ErrorKind::DerivedFieldWrite {
                    entity,
                    field: self.table.field_name(*at),
                }));
            }
            self.store.write(entity, *at, value.clone())?;
        }

        let changed: Vec<FieldRef> = writes.iter().map(|(at, _)| *at).collect();
        let plan = graph.map(|g| g.plan(&changed)).unwrap_or_default();
        self.run(entity, &plan)
    }

    /// Destroys an entity and drops its bindings.
    ///
    /// Every outstanding id, reference and handle for it goes stale.
    ///
    /// # Errors
    ///
    /// Fails if the entity is already dead.
    pub fn destroy(&mut self, entity: EntityId) -> Result<()> {
        self.store.destroy(entity)?;
        self.bindings.remove(&entity);
        Ok(())
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    /// Cast checks against the current state.
    #[must_use]
    pub fn capabilities(&self) -> CapabilityRegistry<'_> {
        CapabilityRegistry::new(&self.table, &self.store)
    }

    /// Narrows a reference to `component`; `Ok(None)` if it is absent.
    ///
    /// # Errors
    ///
    /// Fails for dead references and unregistered components.
    pub fn cast(&self, reference: impl Into<EntityRef>, component: KeywordId) -> Result<Option<ComponentHandle>> {
        self.capabilities().cast(reference.into(), component)
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    /// Registers one binding; see [`World::bind_all`].
    ///
    /// # Errors
    ///
    /// See [`World::bind_all`].
    pub fn bind(&mut self, entity: EntityId, binding: Binding) -> Result<()> {
        self.bind_all(entity, vec![binding])
    }

    /// Registers a set of bindings on one entity.
    ///
    /// A binding for an already derived field replaces the old one. The new
    /// targets, and everything downstream of them, are computed right away.
    /// The set is registered as a whole: if any binding would close a
    /// cycle, or a computation fails, none of them stays registered.
    ///
    /// # Errors
    ///
    /// `BindingCycle` for cyclic sets; also dead ids, fields the entity
    /// does not carry, the per-entity limit, and recompute failures.
    pub fn bind_all(&mut self, entity: EntityId, bindings: Vec<Binding>) -> Result<()> {
        let record = self.store.get(entity)?;
        for binding in &bindings {
            for &at in std::iter::once(&binding.target).chain(&binding.sources) {
                check_field(&self.table, record, at)?;
            }
        }

        let mut graph = self.bindings.get(&entity).cloned().unwrap_or_default();
        let mut targets = Vec::with_capacity(bindings.len());
        for binding in bindings {
            if let Some(path) = graph.find_cycle(&binding) {
                let path: Vec<String> = path.iter().map(|&f| self.table.field_name(f)).collect();
                tracing::warn!(entity = ?entity, cycle = %path.join(" -> "), "rejected binding");
                return Err(Error::binding_cycle(entity, path));
            }
            targets.push(binding.target);
            graph.insert(binding);
        }
        let limit = self.config.max_bindings_per_entity;
        if graph.len() > limit {
            return Err(Error::limit_exceeded(Limit::BindingsPerEntity { limit }));
        }

        let plan = graph.plan_targets(&targets);
        let snapshot = self.store.snapshot(entity)?;
        let previous = self.bindings.insert(entity, graph);
        if let Err(err) = self.run(entity, &plan) {
            self.store.restore(snapshot)?;
            match previous {
                Some(graph) => self.bindings.insert(entity, graph),
                None => self.bindings.remove(&entity),
            };
            return Err(err);
        }

        tracing::debug!(entity = ?entity, count = targets.len(), "registered bindings");
        Ok(())
    }

    /// Removes the binding deriving `target`. The field keeps its last
    /// value and becomes writable again.
    ///
    /// # Errors
    ///
    /// Fails for dead ids.
    pub fn unbind(&mut self, entity: EntityId, target: FieldRef) -> Result<Option<Binding>> {
        self.store.validate(entity)?;
        let Some(graph) = self.bindings.get_mut(&entity) else {
            return Ok(None);
        };
        let removed = graph.remove(target);
        if graph.is_empty() {
            self.bindings.remove(&entity);
        }
        Ok(removed)
    }

    /// Bindings registered on an entity.
    #[must_use]
    pub fn bindings(&self, entity: EntityId) -> Option<&BindingGraph> {
        self.bindings.get(&entity)
    }

    /// Reruns every binding on an entity. With unchanged sources this
    /// leaves every derived value as it was.
    ///
    /// # Errors
    ///
    /// Fails for dead ids and failing recomputes; nothing changes on failure.
    pub fn recompute(&mut self, entity: EntityId) -> Result<()> {
        let snapshot = self.store.snapshot(entity)?;
        let plan = self
            .bindings
            .get(&entity)
            .map(BindingGraph::plan_all)
            .unwrap_or_default();
        let result = self.run(entity, &plan);
        if result.is_err() {
            self.store.restore(snapshot)?;
        }
        result
    }

    fn run(&mut self, entity: EntityId, plan: &[Binding]) -> Result<()> {
        for binding in plan {
            let value = {
                let view = EntityView::new(self.store.get(entity)?, &self.table);
                binding
                    .compute(&view)
                    .map_err(|e| e.in_frame(format!("binding {}", self.table.field_name(binding.target))))?
            };
            self.table.check_write(binding.target, &value)?;
            tracing::trace!(
                entity = ?entity,
                field = %self.table.field_name(binding.target),
                value = %value,
                "recomputed"
            );
            self.store.write(entity, binding.target, value)?;
        }
        Ok(())
    }
}

fn check_field(table: &ComponentTable, record: &EntityRecord, at: FieldRef) -> Result<()> {
    table.field_schema(at)?;
    if record.has(at.component) {
        Ok(())
    } else {
        Err(Error::component_not_found(record.id(), table.name(at.component)))
    }
}
