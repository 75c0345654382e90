//! The plugin runtime: a world, an event bus over it, and the host
//! collaborators plugins call (lookup tables, randomness, messaging).

use std::collections::HashMap;
use std::fmt;

use feji_engine::{Binding, World};
use feji_events::{DispatchReport, Event, EventBus, EventHost, EventKind};
use feji_foundation::{EntityId, Error, ErrorKind, KeywordId, PVec, Result, Type, Value};
use feji_stdlib::{LookupTable, RandomSource, SeededRandom, Template};
use feji_storage::{ComponentSchema, EntityView, FieldRef, FieldSchema};

use crate::config::{PluginConfig, RuntimeConfig};
use crate::plugin::Plugin;

/// Published by the host when a player joins. Context: `player`.
pub const PLAYER_JOIN: &str = "player-join";

/// Published by the host when a player breaks a block. Context: `player`
/// and `block` (the block's name). Cancelling keeps the block in place.
pub const PLAYER_BREAK_BLOCK: &str = "player-break-block";

/// Published by plugins after an item was upgraded. Context: `player` and
/// `target` (the item).
pub const ITEM_UPGRADED: &str = "item-upgraded";

/// Keywords for the components every runtime registers.
#[derive(Clone, Copy, Debug)]
pub struct Builtins {
    /// `item`: anything a player can hold.
    pub item: KeywordId,
    /// `player`: a connected player.
    pub player: KeywordId,
    /// `name` field of `item` and `player`.
    pub name: KeywordId,
    /// `lore` field of `item`: the descriptive text under the name.
    pub lore: KeywordId,
    /// `held-item` field of `player`.
    pub held_item: KeywordId,
    /// `inventory` field of `player`.
    pub inventory: KeywordId,
    /// `block` event context key.
    pub block: KeywordId,
}

impl Builtins {
    fn register(world: &mut World) -> Result<Self> {
        let builtins = Self {
            item: world.intern("item"),
            player: world.intern("player"),
            name: world.intern("name"),
            lore: world.intern("lore"),
            held_item: world.intern("held-item"),
            inventory: world.intern("inventory"),
            block: world.intern("block"),
        };
        world.register_component(
            ComponentSchema::new(builtins.item)
                .with_field(FieldSchema::optional(builtins.name, Type::String, "Item"))
                .with_field(FieldSchema::optional(builtins.lore, Type::String, "")),
        )?;
        world.register_component(
            ComponentSchema::new(builtins.player)
                .with_field(FieldSchema::required(builtins.name, Type::String))
                .with_field(FieldSchema::optional_nil(builtins.held_item, Type::EntityRef))
                .with_field(FieldSchema::optional(
                    builtins.inventory,
                    Type::vec(Type::EntityRef),
                    Value::Vec(PVec::new()),
                )),
        )?;
        Ok(builtins)
    }

    /// `item.lore`.
    #[must_use]
    pub const fn item_lore(&self) -> FieldRef {
        FieldRef::new(self.item, self.lore)
    }

    /// `item.name`.
    #[must_use]
    pub const fn item_name(&self) -> FieldRef {
        FieldRef::new(self.item, self.name)
    }
}

/// A chat message queued for the host to deliver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Recipient.
    pub to: EntityId,
    /// Text, including color codes.
    pub text: String,
}

/// Hosts plugins.
pub struct Runtime {
    world: World,
    bus: EventBus<Runtime>,
    tables: HashMap<String, LookupTable>,
    rng: Box<dyn RandomSource + Send>,
    outbox: Vec<Message>,
    loaded: Vec<String>,
    builtins: Builtins,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("world", &self.world)
            .field("bus", &self.bus)
            .field("tables", &self.tables.keys().collect::<Vec<_>>())
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

impl EventHost for Runtime {
    fn bus(&self) -> &EventBus<Self> {
        &self.bus
    }

    fn bus_mut(&mut self) -> &mut EventBus<Self> {
        &mut self.bus
    }
}

impl Runtime {
    /// Creates a runtime with the built-in components registered.
    ///
    /// # Errors
    ///
    /// Fails only if built-in registration fails.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let mut world = World::new(config.world);
        let builtins = Builtins::register(&mut world)?;
        Ok(Self {
            world,
            bus: EventBus::new(config.bus),
            tables: HashMap::new(),
            rng: Box::new(SeededRandom::new(config.seed)),
            outbox: Vec::new(),
            loaded: Vec::new(),
            builtins,
        })
    }

    /// Replaces the random source.
    #[must_use]
    pub fn with_random(mut self, rng: impl RandomSource + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Built-in component keywords.
    #[must_use]
    pub fn builtins(&self) -> Builtins {
        self.builtins
    }

    /// The world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The world, mutably.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    // =========================================================================
    // Plugins and configuration
    // =========================================================================

    /// Applies operator configuration: lookup tables and seed.
    pub fn apply_config(&mut self, config: &PluginConfig) {
        for table in config.lookup_tables() {
            self.add_table(table);
        }
        if let Some(seed) = config.seed {
            self.rng = Box::new(SeededRandom::new(seed));
        }
    }

    /// Loads a plugin.
    ///
    /// # Errors
    ///
    /// Fails if a plugin of the same name is loaded, or `load` fails.
    pub fn load(&mut self, plugin: &dyn Plugin) -> Result<()> {
        let name = plugin.name().to_string();
        if self.loaded.contains(&name) {
            return Err(Error::new(ErrorKind::Config(format!(
                "plugin {name} is already loaded"
            ))));
        }
        plugin
            .load(self)
            .map_err(|e| e.in_frame(format!("plugin {name}")))?;
        tracing::info!(plugin = %name, "loaded plugin");
        self.loaded.push(name);
        Ok(())
    }

    /// Names of loaded plugins, in load order.
    #[must_use]
    pub fn loaded(&self) -> &[String] {
        &self.loaded
    }

    /// Registers an event handler.
    pub fn on<F>(&mut self, kind: &str, name: &str, handler: F)
    where
        F: Fn(&mut Runtime, &mut Event) -> Result<()> + Send + Sync + 'static,
    {
        self.bus.register(EventKind::new(kind), name, handler);
    }

    // =========================================================================
    // Collaborators
    // =========================================================================

    /// Adds or replaces a lookup table.
    pub fn add_table(&mut self, table: LookupTable) {
        tracing::debug!(table = table.name(), entries = table.len(), "added lookup table");
        self.tables.insert(table.name().to_string(), table);
    }

    /// Looks up `key` in the named table.
    ///
    /// # Errors
    ///
    /// `MissingKey` if the table or the key is absent.
    pub fn lookup(&self, table: &str, key: &str) -> Result<i64> {
        self.tables
            .get(table)
            .ok_or_else(|| Error::missing_key("tables", table))?
            .get(key)
    }

    /// A random integer in `min..=max`.
    ///
    /// # Errors
    ///
    /// Fails when `min > max`.
    pub fn random_int(&mut self, min: i64, max: i64) -> Result<i64> {
        self.rng.random_int(min, max)
    }

    /// Binds `target` to a template. The binding's sources are the fields
    /// the template names plus `extra_sources`; `positional` supplies the
    /// `${}` values from the entity's current state.
    ///
    /// # Errors
    ///
    /// Template parse errors, unresolvable field names, and the errors of
    /// [`World::bind`].
    pub fn bind_text<F>(
        &mut self,
        entity: EntityId,
        target: FieldRef,
        template: &str,
        extra_sources: &[FieldRef],
        positional: F,
    ) -> Result<()>
    where
        F: Fn(&EntityView<'_>) -> Result<Vec<Value>> + Send + Sync + 'static,
    {
        let template = Template::parse(template)?;
        let view = self.world.get(entity)?;
        let mut sources = template
            .fields()
            .map(|path| view.locate(path))
            .collect::<Result<Vec<_>>>()?;
        sources.extend_from_slice(extra_sources);

        let binding = Binding::new(target, sources, move |view| {
            let values = positional(view)?;
            Ok(Value::from(template.render(Some(view), &values)?))
        });
        self.world.bind(entity, binding)
    }

    // =========================================================================
    // Players
    // =========================================================================

    /// Creates a player entity.
    ///
    /// # Errors
    ///
    /// Propagates world errors.
    pub fn spawn_player(&mut self, name: &str) -> Result<EntityId> {
        let b = self.builtins;
        let player = self.world.create(b.player, &[(b.name, Value::from(name))])?;
        tracing::info!(player = %name, entity = ?player, "player spawned");
        Ok(player)
    }

    /// Live players.
    #[must_use]
    pub fn players(&self) -> Vec<EntityId> {
        let player = self.builtins.player;
        self.world
            .entities()
            .filter(|&e| self.world.get(e).is_ok_and(|v| v.has(player)))
            .collect()
    }

    /// A player's name.
    ///
    /// # Errors
    ///
    /// Fails for dead ids and non-players.
    pub fn player_name(&self, player: EntityId) -> Result<String> {
        let at = FieldRef::new(self.builtins.player, self.builtins.name);
        Ok(self.world.read(player, at)?.to_string())
    }

    /// Puts an item in a player's inventory, and in their hand if it is empty.
    ///
    /// # Errors
    ///
    /// Fails for dead ids, non-players, and entities that are not items.
    pub fn give_item(&mut self, player: EntityId, item: EntityId) -> Result<()> {
        let b = self.builtins;
        if self.world.cast(item, b.item)?.is_none() {
            return Err(Error::component_not_found(item, "item"));
        }
        let inventory_at = FieldRef::new(b.player, b.inventory);
        let held_at = FieldRef::new(b.player, b.held_item);

        let inventory = match self.world.read(player, inventory_at)? {
            Value::Vec(items) => items.push_back(Value::EntityRef(item)),
            _ => PVec::new().push_back(Value::EntityRef(item)),
        };
        let mut writes = vec![(inventory_at, Value::Vec(inventory))];
        if self.world.read(player, held_at)?.is_nil() {
            writes.push((held_at, Value::EntityRef(item)));
        }
        self.world.set_fields(player, &writes)
    }

    /// The item a player holds.
    ///
    /// # Errors
    ///
    /// Fails for dead ids and non-players.
    pub fn held_item(&self, player: EntityId) -> Result<Option<EntityId>> {
        let at = FieldRef::new(self.builtins.player, self.builtins.held_item);
        Ok(self.world.read(player, at)?.as_entity())
    }

    /// Queues a chat message.
    pub fn send_message(&mut self, to: EntityId, text: impl Into<String>) {
        let text = text.into();
        tracing::info!(to = ?to, text = %text, "message");
        self.outbox.push(Message { to, text });
    }

    /// Queues a message for every live player.
    pub fn broadcast(&mut self, text: &str) {
        for player in self.players() {
            self.send_message(player, text);
        }
    }

    /// Messages queued so far.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.outbox
    }

    /// Hands queued messages to the host.
    pub fn take_messages(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.outbox)
    }

    // =========================================================================
    // Host events
    // =========================================================================

    /// Publishes [`PLAYER_JOIN`].
    ///
    /// # Errors
    ///
    /// See [`EventHost::publish`].
    pub fn player_join(&mut self, player: EntityId) -> Result<DispatchReport> {
        self.publish(Event::new(PLAYER_JOIN).with_player(player))
    }

    /// Publishes [`PLAYER_BREAK_BLOCK`]. The host should keep the block if
    /// the report says the event was cancelled.
    ///
    /// # Errors
    ///
    /// See [`EventHost::publish`].
    pub fn break_block(&mut self, player: EntityId, block: &str) -> Result<DispatchReport> {
        let event = Event::new(PLAYER_BREAK_BLOCK)
            .with_player(player)
            .with(self.builtins.block, block);
        self.publish(event)
    }
}
