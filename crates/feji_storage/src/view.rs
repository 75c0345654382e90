//! Read-only views of entity fields.

use feji_foundation::{EntityId, Error, ErrorKind, KeywordId, Result, Type, Value};

use crate::component::{EntityRecord, FieldRef};
use crate::table::ComponentTable;

/// Borrowed view of one entity's current field values.
///
/// Binding compute functions and template rendering read through this, so
/// they always see the record as it stands mid-propagation.
#[derive(Clone, Copy)]
pub struct EntityView<'a> {
    record: &'a EntityRecord,
    table: &'a ComponentTable,
}

impl<'a> EntityView<'a> {
    /// Creates a view over a record.
    #[must_use]
    pub fn new(record: &'a EntityRecord, table: &'a ComponentTable) -> Self {
        Self { record, table }
    }

    /// The entity being viewed.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.record.id()
    }

    /// The underlying record.
    #[must_use]
    pub fn record(&self) -> &'a EntityRecord {
        self.record
    }

    /// The component table used to resolve names.
    #[must_use]
    pub fn table(&self) -> &'a ComponentTable {
        self.table
    }

    /// True if the component type is attached.
    #[must_use]
    pub fn has(&self, component: KeywordId) -> bool {
        self.record.has(component)
    }

    /// Reads an exact field address.
    ///
    /// # Errors
    ///
    /// Fails if the component is not attached or has no such field.
    pub fn get(&self, at: FieldRef) -> Result<&'a Value> {
        let component = self.record.component(at.component).ok_or_else(|| {
            Error::component_not_found(self.id(), self.table.name(at.component))
        })?;
        component.get(at.field).ok_or_else(|| {
            Error::attribute_not_found(self.table.name(at.component), self.table.name(at.field))
        })
    }

    /// Reads a field through `component`, including fields it embeds.
    ///
    /// # Errors
    ///
    /// Fails if the field cannot be resolved or its component is missing.
    pub fn field(&self, component: KeywordId, field: KeywordId) -> Result<&'a Value> {
        let at = self.table.resolve_field(component, field)?;
        self.get(at)
    }

    /// Resolves a textual path: `name` or `component.name`.
    ///
    /// An unqualified name must be declared by exactly one attached component.
    ///
    /// # Errors
    ///
    /// `AttributeNotFound` when nothing declares the name, `AmbiguousField`
    /// when several attached components do.
    pub fn resolve(&self, path: &str) -> Result<&'a Value> {
        let at = self.locate(path)?;
        self.get(at)
    }

    /// Resolves a path to its field address without reading it.
    ///
    /// # Errors
    ///
    /// See [`EntityView::resolve`].
    pub fn locate(&self, path: &str) -> Result<FieldRef> {
        let interner = self.table.interner();
        if let Some((component, field)) = path.split_once('.') {
            let component_id = interner
                .lookup(component)
                .filter(|&c| self.table.contains(c))
                .ok_or_else(|| Error::unknown_component(component))?;
            let field_id = interner
                .lookup(field)
                .ok_or_else(|| Error::attribute_not_found(component, field))?;
            return self.table.resolve_field(component_id, field_id);
        }

        let Some(field) = interner.lookup(path) else {
            return Err(Error::attribute_not_found(self.id().to_string(), path));
        };
        let mut owners: Vec<KeywordId> = self
            .record
            .components()
            .map(|c| c.kind)
            .filter(|&kind| {
                self.table
                    .schema(kind)
                    .is_some_and(|schema| schema.field(field).is_some())
            })
            .collect();
        owners.sort_unstable();

        match owners.as_slice() {
            [] => Err(Error::attribute_not_found(self.id().to_string(), path)),
            [owner] => Ok(FieldRef::new(*owner, field)),
            _ => Err(Error::new(ErrorKind::AmbiguousField {
                field: path.to_string(),
                components: owners.iter().map(|&c| self.table.name(c)).collect(),
            })),
        }
    }

    /// Reads a numeric field as `f64`.
    ///
    /// # Errors
    ///
    /// Fails if the path does not resolve or the value is not a number.
    pub fn number(&self, path: &str) -> Result<f64> {
        let value = self.resolve(path)?;
        value
            .as_number()
            .ok_or_else(|| Error::type_mismatch(path, Type::Float, value.value_type()))
    }

    /// Reads a text field.
    ///
    /// # Errors
    ///
    /// Fails if the path does not resolve or the value is not text.
    pub fn text(&self, path: &str) -> Result<&'a str> {
        let value = self.resolve(path)?;
        value
            .as_str()
            .ok_or_else(|| Error::type_mismatch(path, Type::String, value.value_type()))
    }
}

impl std::fmt::Debug for EntityView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityView")
            .field("entity", &self.id())
            .finish_non_exhaustive()
    }
}
