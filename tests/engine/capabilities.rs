//! Integration tests for capability casts and component handles

use feji_engine::{EntityRef, World, WorldConfig};
use feji_foundation::{ErrorKind, KeywordId, Type, Value};
use feji_storage::{ComponentSchema, FieldRef, FieldSchema};

struct Keys {
    item: KeywordId,
    weapon: KeywordId,
    name: KeywordId,
    damage: KeywordId,
}

fn world() -> (World, Keys) {
    let mut world = World::new(WorldConfig::default());
    let keys = Keys {
        item: world.intern("item"),
        weapon: world.intern("weapon"),
        name: world.intern("name"),
        damage: world.intern("damage"),
    };
    world
        .register_component(
            ComponentSchema::new(keys.item).with_field(FieldSchema::optional(keys.name, Type::String, "Item")),
        )
        .unwrap();
    world
        .register_component(
            ComponentSchema::new(keys.weapon)
                .embedding(keys.item)
                .with_field(FieldSchema::optional(keys.damage, Type::Int, 1)),
        )
        .unwrap();
    (world, keys)
}

#[test]
fn attach_makes_a_cast_succeed() {
    let (mut world, keys) = world();
    let stick = world.create(keys.item, &[]).unwrap();
    assert!(world.cast(stick, keys.weapon).unwrap().is_none());

    world.attach(stick, keys.weapon, &[(keys.damage, Value::Int(2))]).unwrap();

    let weapon = world.cast(stick, keys.weapon).unwrap().unwrap();
    assert_eq!(weapon.get(&world, keys.damage).unwrap(), Value::Int(2));
    assert_eq!(weapon.get(&world, keys.name).unwrap(), Value::from("Item"));
}

#[test]
fn attach_twice_fails() {
    let (mut world, keys) = world();
    let sword = world.create(keys.weapon, &[]).unwrap();
    let err = world.attach(sword, keys.weapon, &[]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateComponent(_)));
}

#[test]
fn handles_share_one_record() {
    let (mut world, keys) = world();
    let sword = world.create(keys.weapon, &[]).unwrap();
    let as_weapon = world.cast(sword, keys.weapon).unwrap().unwrap();
    let as_item = world.cast(as_weapon, keys.item).unwrap().unwrap();

    as_weapon.set(&mut world, keys.name, "Blade").unwrap();

    assert_eq!(as_item.get(&world, keys.name).unwrap(), Value::from("Blade"));
    assert_eq!(as_item.entity(), as_weapon.entity());
}

#[test]
fn narrowed_references_recast() {
    let (mut world, keys) = world();
    let sword = world.create(keys.weapon, &[]).unwrap();

    let reference = EntityRef::narrowed(sword, keys.item);
    let handle = world.cast(reference, keys.weapon).unwrap().unwrap();

    assert_eq!(handle.component(), keys.weapon);
    assert!(world.capabilities().provides(sword, keys.item).unwrap());
}

#[test]
fn casts_of_destroyed_entities_fail() {
    let (mut world, keys) = world();
    let sword = world.create(keys.weapon, &[]).unwrap();
    let handle = world.cast(sword, keys.weapon).unwrap().unwrap();
    world.destroy(sword).unwrap();

    assert!(world.cast(sword, keys.item).unwrap_err().is_dead_reference());
    assert!(handle.get(&world, keys.damage).unwrap_err().is_dead_reference());
}

#[test]
fn handles_refuse_ambiguous_fields() {
    let mut world = World::new(WorldConfig::default());
    let label = world.intern("label");
    let tag = world.intern("tag");
    let tool = world.intern("tool");
    let name = world.intern("name");
    world
        .register_component(ComponentSchema::new(label).with_field(FieldSchema::optional(name, Type::String, "L")))
        .unwrap();
    world
        .register_component(ComponentSchema::new(tag).with_field(FieldSchema::optional(name, Type::String, "T")))
        .unwrap();
    world
        .register_component(ComponentSchema::new(tool).embedding(label).embedding(tag))
        .unwrap();

    let hammer = world.create(tool, &[]).unwrap();
    let handle = world.cast(hammer, tool).unwrap().unwrap();

    let err = handle.get(&world, name).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AmbiguousField { .. }));
    let err = handle.set(&mut world, name, "X").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AmbiguousField { .. }));

    assert_eq!(world.read(hammer, FieldRef::new(label, name)).unwrap(), Value::from("L"));
    assert_eq!(world.read(hammer, FieldRef::new(tag, name)).unwrap(), Value::from("T"));
}
