//! Integration tests for event dispatch against world state

use feji_engine::{World, WorldConfig};
use feji_events::{BusConfig, Event, EventBus, EventHost, EventKind};
use feji_foundation::{EntityId, Error, ErrorKind, KeywordId, Type, Value};
use feji_storage::{ComponentSchema, FieldRef, FieldSchema};

struct Server {
    world: World,
    bus: EventBus<Server>,
    score: FieldRef,
}

impl EventHost for Server {
    fn bus(&self) -> &EventBus<Self> {
        &self.bus
    }

    fn bus_mut(&mut self) -> &mut EventBus<Self> {
        &mut self.bus
    }
}

fn server(config: BusConfig) -> (Server, EntityId) {
    let mut world = World::new(WorldConfig::default());
    let scored = world.intern("scored");
    let score = world.intern("score");
    world
        .register_component(ComponentSchema::new(scored).with_field(FieldSchema::optional(score, Type::Int, 0)))
        .unwrap();
    let player = world.create(scored, &[]).unwrap();
    (
        Server {
            world,
            bus: EventBus::new(config),
            score: FieldRef::new(scored, score),
        },
        player,
    )
}

fn add_points(points: i64) -> impl Fn(&mut Server, &mut Event) -> feji_foundation::Result<()> + Send + Sync {
    move |s, e| {
        let player = e.player().ok_or_else(|| Error::missing_key("event", "player"))?;
        let current = s.world.read(player, s.score)?.as_int().unwrap_or(0);
        s.world.set_field(player, s.score, Value::Int(current + points))
    }
}

fn score(server: &Server, player: EntityId) -> Value {
    server.world.read(player, server.score).unwrap()
}

#[test]
fn handlers_mutate_the_world_in_order() {
    let (mut server, player) = server(BusConfig::default());
    server.bus.register("goal", "double", |s: &mut Server, e: &mut Event| {
        let player = e.player().unwrap_or(EntityId::new(0, 1));
        let current = s.world.read(player, s.score)?.as_int().unwrap_or(0);
        s.world.set_field(player, s.score, Value::Int(current * 2))
    });
    server.bus.register("goal", "plus-one", add_points(1));

    server.publish(Event::new("goal").with_player(player)).unwrap();
    server.publish(Event::new("goal").with_player(player)).unwrap();

    // (0 * 2 + 1) * 2 + 1
    assert_eq!(score(&server, player), Value::Int(3));
}

#[test]
fn failures_carry_the_handler_frame() {
    let (mut server, _) = server(BusConfig::default());
    server.bus.register("goal", "needs-player", add_points(1));

    let report = server.publish(Event::new("goal")).unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(&*report.failures[0].handler, "needs-player");
    let context = report.failures[0].error.context.as_ref().unwrap();
    assert_eq!(context.stack.last().unwrap(), "handler needs-player");
}

#[test]
fn handlers_see_a_destroyed_entity_as_dead() {
    let (mut server, player) = server(BusConfig::default());
    server.bus.register("goal", "score", add_points(1));
    server.world.destroy(player).unwrap();

    let report = server.publish(Event::new("goal").with_player(player)).unwrap();

    assert!(report.failures[0].error.is_dead_reference());
}

#[test]
fn nested_events_finish_before_the_outer_handler_resumes() {
    let (mut server, player) = server(BusConfig::default());
    server.bus.register("goal", "bonus", |s: &mut Server, e: &mut Event| {
        let player = e.player().unwrap_or(EntityId::new(0, 1));
        s.publish(Event::new("bonus").with_player(player))?;
        // The bonus handler has already written.
        let current = s.world.read(player, s.score)?.as_int().unwrap_or(0);
        e.set(KeywordId::TARGET, Value::Int(current));
        Ok(())
    });
    server.bus.register("bonus", "ten", add_points(10));

    let report = server.publish(Event::new("goal").with_player(player)).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.event.get(KeywordId::TARGET), Some(&Value::Int(10)));
}

#[test]
fn nesting_is_bounded() {
    let (mut server, _) = server(BusConfig::new().with_max_depth(1));
    server.bus.register("outer", "nest", |s: &mut Server, _: &mut Event| {
        s.publish(Event::new("inner")).map(|_| ())
    });

    let report = server.publish(Event::new("outer")).unwrap();

    assert!(matches!(
        report.failures[0].error.kind,
        ErrorKind::LimitExceeded(_)
    ));
    assert_eq!(server.bus.depth(), 0);
}

#[test]
fn manual_stepping_exposes_progress() {
    let (mut server, player) = server(BusConfig::default());
    server.bus.register("goal", "one", add_points(1));
    server.bus.register("goal", "two", add_points(2));

    let mut dispatch = server.bus.begin(Event::new("goal").with_player(player)).unwrap();
    assert!(server.bus.is_dispatching(&EventKind::new("goal")));
    assert!(dispatch.step(&mut server));
    assert_eq!(score(&server, player), Value::Int(1));

    let report = server.bus.finish(dispatch);

    assert_eq!(report.handlers_run, 1);
    assert!(!server.bus.is_dispatching(&EventKind::new("goal")));
}
