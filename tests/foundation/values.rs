//! Integration tests for Value, Type, and EntityId

use feji_foundation::{EntityId, PMap, PVec, Type, Value};

// =============================================================================
// Value
// =============================================================================

#[test]
fn numbers_display_without_trailing_zero() {
    assert_eq!(Value::Float(2.0).to_string(), "2");
    assert_eq!(Value::Float(1.5).to_string(), "1.5");
    assert_eq!(Value::Int(7).to_string(), "7");
}

#[test]
fn strings_display_raw() {
    assert_eq!(Value::from("Pickaexe").to_string(), "Pickaexe");
}

#[test]
fn numeric_accessors() {
    assert_eq!(Value::Int(4).as_number(), Some(4.0));
    assert_eq!(Value::Float(0.5).as_number(), Some(0.5));
    assert_eq!(Value::from("4").as_number(), None);
    assert_eq!(Value::Float(4.0).as_int(), None);
}

#[test]
fn entity_refs_round_trip_through_values() {
    let id = EntityId::new(9, 3);
    assert_eq!(Value::from(id).as_entity(), Some(id));
    assert_eq!(Value::Nil.as_entity(), None);
}

#[test]
fn collections_are_persistent() {
    let empty: PVec<Value> = PVec::new();
    let one = empty.push_back(Value::Int(1));
    assert!(empty.is_empty());
    assert_eq!(one.len(), 1);

    let map: PMap<u32, Value> = PMap::new();
    let filled = map.insert(1, Value::Bool(true));
    assert!(map.is_empty());
    assert_eq!(filled.get(&1), Some(&Value::Bool(true)));
}

// =============================================================================
// Type
// =============================================================================

#[test]
fn float_fields_accept_integers() {
    assert!(Type::Float.accepts(&Type::Int));
    assert!(!Type::Int.accepts(&Type::Float));
}

#[test]
fn optional_types_accept_nil() {
    let held = Type::option(Type::EntityRef);
    assert!(held.accepts(&Type::Nil));
    assert!(held.accepts(&Type::EntityRef));
    assert!(!Type::EntityRef.accepts(&Type::Nil));
}

#[test]
fn collection_values_match_typed_declarations() {
    let inventory = Value::Vec(PVec::new().push_back(Value::from(EntityId::new(0, 1))));
    assert!(Type::vec(Type::EntityRef).accepts(&inventory.value_type()));
}

// =============================================================================
// EntityId
// =============================================================================

#[test]
fn ids_pack_into_bits() {
    let id = EntityId::new(12, 5);
    assert_eq!(EntityId::from_bits(id.to_bits()), id);
    assert_eq!(id.to_string(), "#12");
}
