//! Integration tests for entity storage
//!
//! Tests spawning, destruction, generational ids, and snapshots.

use feji_foundation::{EntityId, Interner, Value};
use feji_storage::{Component, EntityStore, FieldRef};

fn counter(interner: &mut Interner) -> (Component, FieldRef) {
    let counter = interner.intern("counter");
    let count = interner.intern("count");
    (
        Component::new(counter).with(count, 0),
        FieldRef::new(counter, count),
    )
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn spawned_entities_are_live() {
    let mut interner = Interner::new();
    let (component, _) = counter(&mut interner);
    let mut store = EntityStore::new();

    let a = store.spawn(vec![component.clone()]).unwrap();
    let b = store.spawn(vec![component]).unwrap();

    assert!(store.exists(a));
    assert!(store.exists(b));
    assert_ne!(a, b);
    assert_eq!(store.len(), 2);
    assert_eq!(store.iter().collect::<Vec<_>>(), vec![a, b]);
}

#[test]
fn destroyed_ids_go_stale_when_the_slot_is_reused() {
    let mut interner = Interner::new();
    let (component, _) = counter(&mut interner);
    let mut store = EntityStore::new();

    let old = store.spawn(vec![component.clone()]).unwrap();
    store.destroy(old).unwrap();
    let new = store.spawn(vec![component]).unwrap();

    assert_eq!(old.index, new.index);
    assert_ne!(old.generation, new.generation);
    assert!(store.get(old).unwrap_err().is_dead_reference());
    assert!(store.exists(new));
}

#[test]
fn never_issued_ids_are_not_found() {
    let store = EntityStore::new();
    let err = store.get(EntityId::new(4, 1)).unwrap_err();
    assert!(matches!(err.kind, feji_foundation::ErrorKind::EntityNotFound(_)));
}

#[test]
fn duplicate_components_are_rejected() {
    let mut interner = Interner::new();
    let (component, _) = counter(&mut interner);
    let mut store = EntityStore::new();

    assert!(store.spawn(vec![component.clone(), component]).is_err());
    assert!(store.is_empty());
}

// =============================================================================
// Writes and snapshots
// =============================================================================

#[test]
fn snapshots_restore_earlier_state() {
    let mut interner = Interner::new();
    let (component, count) = counter(&mut interner);
    let mut store = EntityStore::new();
    let id = store.spawn(vec![component]).unwrap();

    let snapshot = store.snapshot(id).unwrap();
    let previous = store.write(id, count, Value::Int(5)).unwrap();
    assert_eq!(previous, Value::Int(0));

    store.restore(snapshot).unwrap();
    assert_eq!(store.get(id).unwrap().get(count), Some(&Value::Int(0)));
}

#[test]
fn snapshots_of_destroyed_entities_cannot_be_restored() {
    let mut interner = Interner::new();
    let (component, _) = counter(&mut interner);
    let mut store = EntityStore::new();
    let id = store.spawn(vec![component]).unwrap();

    let snapshot = store.snapshot(id).unwrap();
    store.destroy(id).unwrap();

    assert!(store.restore(snapshot).is_err());
}
