//! Integration tests for EntityView field paths

use feji_foundation::{ErrorKind, Type, Value};
use feji_storage::{Archetype, ComponentSchema, ComponentTable, EntityStore, EntityView, FieldSchema};

fn world() -> (ComponentTable, EntityStore, feji_foundation::EntityId) {
    let mut table = ComponentTable::new();
    let item = table.intern("item");
    let pickaxe = table.intern("pickaxe");
    let name = table.intern("name");
    let strength = table.intern("strength");

    table
        .register(ComponentSchema::new(item).with_field(FieldSchema::optional(name, Type::String, "Item")))
        .unwrap();
    table
        .register(
            ComponentSchema::new(pickaxe)
                .embedding(item)
                .with_field(FieldSchema::required(strength, Type::Int)),
        )
        .unwrap();

    let mut store = EntityStore::new();
    let parts = table
        .instantiate(pickaxe, &[(strength, Value::Int(4))], &Archetype::new())
        .unwrap();
    let id = store.spawn(parts).unwrap();
    (table, store, id)
}

#[test]
fn paths_read_through_composition() {
    let (table, store, id) = world();
    let view = EntityView::new(store.get(id).unwrap(), &table);

    assert_eq!(view.number("strength").unwrap(), 4.0);
    assert_eq!(view.text("name").unwrap(), "Item");
    assert_eq!(view.text("item.name").unwrap(), "Item");
    assert_eq!(view.id(), id);
}

#[test]
fn wrong_types_are_mismatches() {
    let (table, store, id) = world();
    let view = EntityView::new(store.get(id).unwrap(), &table);

    assert!(matches!(view.text("strength").unwrap_err().kind, ErrorKind::TypeMismatch { .. }));
    assert!(matches!(view.number("name").unwrap_err().kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn unknown_paths_are_reported() {
    let (table, store, id) = world();
    let view = EntityView::new(store.get(id).unwrap(), &table);

    assert!(matches!(view.resolve("speed").unwrap_err().kind, ErrorKind::AttributeNotFound { .. }));
    assert!(matches!(view.resolve("sword.name").unwrap_err().kind, ErrorKind::UnknownComponent(_)));
}
