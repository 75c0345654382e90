//! The component table: registered component types and how they compose.

use std::collections::HashMap;

use feji_foundation::{Error, ErrorKind, Interner, KeywordId, Result, Value};

use crate::component::{Archetype, Component, FieldRef};
use crate::schema::{ComponentSchema, FieldSchema};

/// Registry of component types.
///
/// Owns the interner, so every component, field and event name in a world
/// is resolved here. A component's composition set is itself plus the
/// composition sets of everything it requires. Requirements must be
/// registered first, which keeps the composition relation acyclic.
#[derive(Clone, Debug)]
pub struct ComponentTable {
    interner: Interner,
    schemas: HashMap<KeywordId, ComponentSchema>,
    compositions: HashMap<KeywordId, Archetype>,
}

impl Default for ComponentTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            schemas: HashMap::new(),
            compositions: HashMap::new(),
        }
    }

    /// Interns a name.
    pub fn intern(&mut self, name: &str) -> KeywordId {
        self.interner.intern(name)
    }

    /// The interner backing this table.
    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Text of a keyword, for messages.
    #[must_use]
    pub fn name(&self, id: KeywordId) -> String {
        self.interner.display(id)
    }

    /// `component.field`, for messages.
    #[must_use]
    pub fn field_name(&self, at: FieldRef) -> String {
        format!("{}.{}", self.name(at.component), self.name(at.field))
    }

    /// Registers a component type.
    ///
    /// # Errors
    ///
    /// Fails if the name is taken or a required component is not registered.
    pub fn register(&mut self, schema: ComponentSchema) -> Result<()> {
        if self.schemas.contains_key(&schema.name) {
            return Err(Error::new(ErrorKind::DuplicateComponent(
                self.name(schema.name),
            )));
        }

        let mut composition = Archetype::from_components(vec![schema.name]);
        for &required in &schema.requires {
            let inner = self
                .compositions
                .get(&required)
                .ok_or_else(|| Error::unknown_component(self.name(required)))?;
            composition = composition.union(inner);
        }

        tracing::debug!(
            component = %self.name(schema.name),
            embeds = composition.len() - 1,
            "registered component"
        );
        self.compositions.insert(schema.name, composition);
        self.schemas.insert(schema.name, schema);
        Ok(())
    }

    /// Schema of a registered component.
    #[must_use]
    pub fn schema(&self, component: KeywordId) -> Option<&ComponentSchema> {
        self.schemas.get(&component)
    }

    /// True if the component type is registered.
    #[must_use]
    pub fn contains(&self, component: KeywordId) -> bool {
        self.schemas.contains_key(&component)
    }

    /// The component plus everything it embeds.
    ///
    /// # Errors
    ///
    /// Fails for unregistered components.
    pub fn composition(&self, component: KeywordId) -> Result<&Archetype> {
        self.compositions
            .get(&component)
            .ok_or_else(|| Error::unknown_component(self.name(component)))
    }

    /// Finds the component in `component`'s composition set that declares
    /// `field`. The component itself wins over anything it embeds.
    ///
    /// # Errors
    ///
    /// Fails if the component is unknown or no member declares the field,
    /// and with `AmbiguousField` when several embedded members do.
    pub fn resolve_field(&self, component: KeywordId, field: KeywordId) -> Result<FieldRef> {
        let schema = self
            .schema(component)
            .ok_or_else(|| Error::unknown_component(self.name(component)))?;
        if schema.field(field).is_some() {
            return Ok(FieldRef::new(component, field));
        }
        let owners: Vec<KeywordId> = self
            .composition(component)?
            .components()
            .iter()
            .copied()
            .filter(|&member| {
                self.schemas
                    .get(&member)
                    .is_some_and(|s| s.field(field).is_some())
            })
            .collect();

        match owners.as_slice() {
            [] => Err(Error::attribute_not_found(self.name(component), self.name(field))),
            [owner] => Ok(FieldRef::new(*owner, field)),
            _ => Err(Error::new(ErrorKind::AmbiguousField {
                field: self.name(field),
                components: owners.iter().map(|&c| self.name(c)).collect(),
            })),
        }
    }

    /// Schema of an addressed field.
    ///
    /// # Errors
    ///
    /// Fails if the component is unknown or lacks the field.
    pub fn field_schema(&self, at: FieldRef) -> Result<&FieldSchema> {
        self.schema(at.component)
            .ok_or_else(|| Error::unknown_component(self.name(at.component)))?
            .field(at.field)
            .ok_or_else(|| Error::attribute_not_found(self.name(at.component), self.name(at.field)))
    }

    /// Validates a value against a field's declared type.
    ///
    /// # Errors
    ///
    /// Fails on unknown fields and type mismatches.
    pub fn check_write(&self, at: FieldRef, value: &Value) -> Result<()> {
        let schema = self.field_schema(at)?;
        let actual = value.value_type();
        if schema.ty.accepts(&actual) {
            Ok(())
        } else {
            Err(Error::type_mismatch(
                self.field_name(at),
                schema.ty.clone(),
                actual,
            ))
        }
    }

    /// Builds the instances needed to give an entity `component`.
    ///
    /// One instance is produced for every member of the composition set not
    /// already in `present`. Field values come from `overrides` (addressed by
    /// field name, resolved through the composition set) or schema defaults.
    ///
    /// # Errors
    ///
    /// Fails on unknown components or fields, type mismatches, missing
    /// required fields, and overrides aimed at a component in `present`.
    pub fn instantiate(
        &self,
        component: KeywordId,
        overrides: &[(KeywordId, Value)],
        present: &Archetype,
    ) -> Result<Vec<Component>> {
        if present.contains(component) {
            return Err(Error::new(ErrorKind::DuplicateComponent(
                self.name(component),
            )));
        }

        let mut resolved: HashMap<FieldRef, Value> = HashMap::with_capacity(overrides.len());
        for (field, value) in overrides {
            let at = self.resolve_field(component, *field)?;
            if present.contains(at.component) {
                return Err(Error::new(ErrorKind::DuplicateComponent(
                    self.name(at.component),
                )));
            }
            self.check_write(at, value)?;
            resolved.insert(at, value.clone());
        }

        let mut instances = Vec::new();
        for &member in self.composition(component)?.components() {
            if present.contains(member) {
                continue;
            }
            let schema = self
                .schema(member)
                .ok_or_else(|| Error::unknown_component(self.name(member)))?;
            let mut instance = Component::new(member);
            for field in &schema.fields {
                let at = FieldRef::new(member, field.name);
                let value = match resolved.remove(&at) {
                    Some(value) => value,
                    None if field.required => {
                        return Err(Error::attribute_not_found(
                            self.name(member),
                            self.name(field.name),
                        )
                        .in_frame(format!("constructor {}", self.name(component))));
                    }
                    None => field.initial_value(),
                };
                instance.fields.set(field.name, value);
            }
            instances.push(instance);
        }
        Ok(instances)
    }
}
