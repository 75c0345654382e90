//! A plugin written against the runtime API alone.

use feji_engine::Binding;
use feji_events::{Event, EventHost};
use feji_foundation::{ErrorKind, Result, Type, Value};
use feji_runtime::{ITEM_UPGRADED, PLAYER_BREAK_BLOCK, PLAYER_JOIN, Plugin, Runtime, RuntimeConfig};
use feji_storage::{ComponentSchema, FieldRef, FieldSchema};

/// Counts blocks broken with a charm in hand; the charm's lore shows the
/// count and its rank.
struct Charm;

impl Plugin for Charm {
    fn name(&self) -> &str {
        "charm"
    }

    fn load(&self, runtime: &mut Runtime) -> Result<()> {
        let b = runtime.builtins();
        let world = runtime.world_mut();
        let charm = world.intern("charm");
        let broken = world.intern("broken");
        let rank = world.intern("rank");
        world.register_component(
            ComponentSchema::new(charm)
                .embedding(b.item)
                .with_field(FieldSchema::optional(broken, Type::Int, 0))
                .with_field(FieldSchema::optional(rank, Type::String, "")),
        )?;

        runtime.on(PLAYER_JOIN, "charm/give", move |rt, event| {
            let Some(player) = event.player() else {
                return Ok(());
            };
            let item = rt.world_mut().create(charm, &[(b.name, Value::from("Charm"))])?;
            let (broken_at, rank_at) = (FieldRef::new(charm, broken), FieldRef::new(charm, rank));
            rt.world_mut().bind(
                item,
                Binding::new(rank_at, [broken_at], move |view| {
                    let n = view.get(broken_at)?.as_int().unwrap_or(0);
                    Ok(Value::from(if n >= 2 { "seasoned" } else { "fresh" }))
                }),
            )?;
            rt.bind_text(item, b.item_lore(), "${broken} blocks, ${rank}", &[], |_| Ok(vec![]))?;
            rt.give_item(player, item)
        });

        runtime.on(PLAYER_BREAK_BLOCK, "charm/count", move |rt, event| {
            let Some(player) = event.player() else {
                return Ok(());
            };
            let Some(held) = rt.held_item(player)? else {
                return Ok(());
            };
            let Some(handle) = rt.world().cast(held, charm)? else {
                return Ok(());
            };
            let n = handle.get(rt.world(), broken)?.as_int().unwrap_or(0);
            handle.set(rt.world_mut(), broken, n + 1)?;
            if n + 1 == 2 {
                rt.publish(Event::new(ITEM_UPGRADED).with_player(player).with_target(held))?;
            }
            Ok(())
        });

        runtime.on(ITEM_UPGRADED, "charm/cheer", |rt, event| {
            if let Some(player) = event.player() {
                rt.send_message(player, "ding");
            }
            Ok(())
        });
        Ok(())
    }
}

fn setup() -> (Runtime, feji_foundation::EntityId) {
    let mut runtime = Runtime::new(RuntimeConfig::default()).unwrap();
    runtime.load(&Charm).unwrap();
    let player = runtime.spawn_player("Alex").unwrap();
    runtime.player_join(player).unwrap();
    (runtime, player)
}

fn player_of(runtime: &Runtime) -> feji_foundation::EntityId {
    runtime.players()[0]
}

fn lore(runtime: &Runtime, player: feji_foundation::EntityId) -> Value {
    let item = runtime.held_item(player).unwrap().unwrap();
    runtime.world().read(item, runtime.builtins().item_lore()).unwrap()
}

#[test]
fn chained_bindings_follow_every_break() {
    let (mut runtime, player) = setup();
    assert_eq!(lore(&runtime, player), Value::from("0 blocks, fresh"));

    runtime.break_block(player, "dirt").unwrap();
    assert_eq!(lore(&runtime, player), Value::from("1 blocks, fresh"));

    let report = runtime.break_block(player, "dirt").unwrap();
    assert!(report.is_clean());
    assert_eq!(lore(&runtime, player), Value::from("2 blocks, seasoned"));
    assert_eq!(runtime.messages().last().unwrap().text, "ding");
}

#[test]
fn derived_lore_cannot_be_overwritten() {
    let (mut runtime, player) = setup();
    let item = runtime.held_item(player).unwrap().unwrap();
    let lore_at = runtime.builtins().item_lore();

    let err = runtime
        .world_mut()
        .set_field(item, lore_at, Value::from("forged"))
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::DerivedFieldWrite { .. }));
}

#[test]
fn the_same_event_kind_cannot_nest() {
    let (mut runtime, player) = setup();
    runtime.on(ITEM_UPGRADED, "charm/echo", |rt, event| {
        let echo = Event::new(ITEM_UPGRADED).with_player(event.player().unwrap_or(player_of(rt)));
        rt.publish(echo).map(|_| ())
    });

    let report = runtime.publish(Event::new(ITEM_UPGRADED).with_player(player)).unwrap();

    assert_eq!(report.handlers_run, 2);
    assert!(matches!(
        report.failures[0].error.kind,
        ErrorKind::ReentrantPublish(_)
    ));
}
