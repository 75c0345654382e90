//! Integration tests for component registration and composition sets

use feji_foundation::{ErrorKind, Type, Value};
use feji_storage::{Archetype, ComponentSchema, ComponentTable, FieldRef, FieldSchema};

fn tools() -> ComponentTable {
    let mut table = ComponentTable::new();
    let item = table.intern("item");
    let tool = table.intern("tool");
    let pickaxe = table.intern("pickaxe");
    let name = table.intern("name");
    let durability = table.intern("durability");
    let strength = table.intern("strength");

    table
        .register(ComponentSchema::new(item).with_field(FieldSchema::optional(name, Type::String, "Item")))
        .unwrap();
    table
        .register(
            ComponentSchema::new(tool)
                .embedding(item)
                .with_field(FieldSchema::optional(durability, Type::Int, 100)),
        )
        .unwrap();
    table
        .register(
            ComponentSchema::new(pickaxe)
                .embedding(tool)
                .with_field(FieldSchema::required(strength, Type::Int)),
        )
        .unwrap();
    table
}

fn kw(table: &ComponentTable, name: &str) -> feji_foundation::KeywordId {
    table.interner().lookup(name).unwrap()
}

// =============================================================================
// Composition
// =============================================================================

#[test]
fn composition_is_transitive() {
    let table = tools();
    let set = table.composition(kw(&table, "pickaxe")).unwrap();

    assert_eq!(set.len(), 3);
    assert!(set.contains(kw(&table, "item")));
    assert!(set.contains(kw(&table, "tool")));
}

#[test]
fn embedding_an_unregistered_component_fails() {
    let mut table = ComponentTable::new();
    let sword = table.intern("sword");
    let blade = table.intern("blade");

    let err = table.register(ComponentSchema::new(sword).embedding(blade)).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::UnknownComponent(_)));
    assert!(!table.contains(sword));
}

#[test]
fn duplicate_registration_fails() {
    let mut table = tools();
    let item = kw(&table, "item");
    let err = table.register(ComponentSchema::new(item)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateComponent(_)));
}

// =============================================================================
// Field resolution
// =============================================================================

#[test]
fn fields_resolve_to_the_declaring_component() {
    let table = tools();
    let at = table
        .resolve_field(kw(&table, "pickaxe"), kw(&table, "name"))
        .unwrap();
    assert_eq!(at, FieldRef::new(kw(&table, "item"), kw(&table, "name")));
    assert_eq!(table.field_name(at), "item.name");
}

#[test]
fn unknown_fields_are_reported() {
    let mut table = tools();
    let colour = table.intern("colour");
    let err = table.resolve_field(kw(&table, "pickaxe"), colour).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AttributeNotFound { .. }));
}

#[test]
fn a_field_declared_by_two_embedded_members_is_ambiguous() {
    let mut table = ComponentTable::new();
    let label = table.intern("label");
    let tag = table.intern("tag");
    let tool = table.intern("tool");
    let name = table.intern("name");
    table
        .register(ComponentSchema::new(label).with_field(FieldSchema::optional(name, Type::String, "L")))
        .unwrap();
    table
        .register(ComponentSchema::new(tag).with_field(FieldSchema::optional(name, Type::String, "T")))
        .unwrap();
    table
        .register(ComponentSchema::new(tool).embedding(label).embedding(tag))
        .unwrap();

    let err = table.resolve_field(tool, name).unwrap_err();
    match err.kind {
        ErrorKind::AmbiguousField { ref components, .. } => {
            assert_eq!(components.len(), 2);
            assert!(components.contains(&"label".to_string()));
            assert!(components.contains(&"tag".to_string()));
        }
        ref other => panic!("unexpected error: {other:?}"),
    }

    let err = table
        .instantiate(tool, &[(name, Value::from("X"))], &Archetype::new())
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AmbiguousField { .. }));
}

#[test]
fn an_own_field_shadows_embedded_declarations() {
    let mut table = ComponentTable::new();
    let label = table.intern("label");
    let tag = table.intern("tag");
    let tool = table.intern("tool");
    let name = table.intern("name");
    table
        .register(ComponentSchema::new(label).with_field(FieldSchema::optional(name, Type::String, "L")))
        .unwrap();
    table
        .register(ComponentSchema::new(tag).with_field(FieldSchema::optional(name, Type::String, "T")))
        .unwrap();
    table
        .register(
            ComponentSchema::new(tool)
                .embedding(label)
                .embedding(tag)
                .with_field(FieldSchema::optional(name, Type::String, "Tool")),
        )
        .unwrap();

    assert_eq!(table.resolve_field(tool, name).unwrap(), FieldRef::new(tool, name));
}

// =============================================================================
// Instantiation
// =============================================================================

#[test]
fn instantiate_builds_every_member() {
    let table = tools();
    let overrides = [
        (kw(&table, "strength"), Value::Int(3)),
        (kw(&table, "name"), Value::from("Digger")),
    ];

    let parts = table
        .instantiate(kw(&table, "pickaxe"), &overrides, &Archetype::new())
        .unwrap();

    assert_eq!(parts.len(), 3);
    let item = parts.iter().find(|c| c.kind == kw(&table, "item")).unwrap();
    assert_eq!(item.get(kw(&table, "name")), Some(&Value::from("Digger")));
    let tool = parts.iter().find(|c| c.kind == kw(&table, "tool")).unwrap();
    assert_eq!(tool.get(kw(&table, "durability")), Some(&Value::Int(100)));
}

#[test]
fn required_fields_must_be_supplied() {
    let table = tools();
    let err = table
        .instantiate(kw(&table, "pickaxe"), &[], &Archetype::new())
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AttributeNotFound { .. }));
}

#[test]
fn overrides_are_type_checked() {
    let table = tools();
    let err = table
        .instantiate(
            kw(&table, "pickaxe"),
            &[(kw(&table, "strength"), Value::from("strong"))],
            &Archetype::new(),
        )
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn present_members_are_skipped() {
    let table = tools();
    let present = Archetype::from_components(vec![kw(&table, "item")]);

    let parts = table
        .instantiate(kw(&table, "tool"), &[], &present)
        .unwrap();

    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].kind, kw(&table, "tool"));
}
