//! The bundled pickaxe plugin.
//!
//! Joining players get a pickaxe whose lore tracks its stats. Breaking a
//! block the pickaxe is too weak for is cancelled, and every break has a
//! chance to upgrade the pickaxe in the player's hand.

use feji_engine::ComponentHandle;
use feji_events::{Event, EventHost};
use feji_foundation::{EntityId, Error, KeywordId, Result, Type, Value};
use feji_stdlib::format;
use feji_storage::{ComponentSchema, FieldRef, FieldSchema};
use serde::{Deserialize, Serialize};

use crate::config::PluginConfig;
use crate::plugin::Plugin;
use crate::runtime::{ITEM_UPGRADED, PLAYER_BREAK_BLOCK, PLAYER_JOIN, Runtime};

/// Lore template for every pickaxe. `${}` is the cost, `sqrt(strength * speed)`.
pub const LORE: &str = "Strength: ${strength}\nSpeed: ${speed}\nCost: ${}";

/// `[settings.pickaxe]` in the plugin config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PickaxeSettings {
    /// Display name of new pickaxes.
    pub name: String,
    /// Starting strength.
    pub strength: i64,
    /// Starting speed.
    pub speed: i64,
    /// Lookup table mapping block names to the strength they need.
    pub strength_table: String,
    /// Each break rolls `0..=upgrade_roll`; rolling the maximum upgrades.
    pub upgrade_roll: i64,
}

impl Default for PickaxeSettings {
    fn default() -> Self {
        Self {
            name: "Pickaexe".to_string(),
            strength: 1,
            speed: 1,
            strength_table: "block-strength".to_string(),
            upgrade_roll: 5,
        }
    }
}

/// Keywords of the `pickaxe` component.
#[derive(Clone, Copy, Debug)]
struct Keys {
    pickaxe: KeywordId,
    strength: KeywordId,
    speed: KeywordId,
}

impl Keys {
    fn resolve(runtime: &Runtime) -> Result<Self> {
        let world = runtime.world();
        let pickaxe = world
            .keyword("pickaxe")
            .filter(|&k| world.table().contains(k))
            .ok_or_else(|| Error::unknown_component("pickaxe"))?;
        let field = |name: &str| {
            world
                .keyword(name)
                .ok_or_else(|| Error::attribute_not_found("pickaxe", name))
        };
        Ok(Self {
            pickaxe,
            strength: field("strength")?,
            speed: field("speed")?,
        })
    }

    fn strength_at(self) -> FieldRef {
        FieldRef::new(self.pickaxe, self.strength)
    }

    fn speed_at(self) -> FieldRef {
        FieldRef::new(self.pickaxe, self.speed)
    }
}

/// Reads an integer stat, refusing anything else.
fn stat(value: &Value, field: &str) -> Result<i64> {
    value
        .as_int()
        .ok_or_else(|| Error::type_mismatch(field, Type::Int, value.value_type()))
}

/// Adds one to a stat.
fn raised(value: i64, field: &str) -> Result<i64> {
    value
        .checked_add(1)
        .ok_or_else(|| Error::invalid_argument(format!("pickaxe.{field} is already at its maximum")))
}

/// The pickaxe plugin.
#[derive(Clone, Debug, Default)]
pub struct PickaxePlugin {
    settings: PickaxeSettings,
}

impl PickaxePlugin {
    /// Creates the plugin with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the plugin with the settings found in `config`.
    ///
    /// # Errors
    ///
    /// `Config` errors for a malformed `[settings.pickaxe]` section.
    pub fn from_config(config: &PluginConfig) -> Result<Self> {
        Ok(Self {
            settings: config.settings("pickaxe")?,
        })
    }

    /// Active settings.
    #[must_use]
    pub fn settings(&self) -> &PickaxeSettings {
        &self.settings
    }

    /// Creates a pickaxe entity with its lore bound to its stats.
    ///
    /// # Errors
    ///
    /// Fails if the plugin is not loaded.
    pub fn create(runtime: &mut Runtime, strength: i64, speed: i64, name: &str) -> Result<EntityId> {
        let keys = Keys::resolve(runtime)?;
        let b = runtime.builtins();
        let pick = runtime.world_mut().create(
            keys.pickaxe,
            &[
                (keys.strength, Value::Int(strength)),
                (keys.speed, Value::Int(speed)),
                (b.name, Value::from(name)),
            ],
        )?;

        let (strength_at, speed_at) = (keys.strength_at(), keys.speed_at());
        runtime.bind_text(pick, b.item_lore(), LORE, &[], move |view| {
            let strength = stat(view.get(strength_at)?, "pickaxe.strength")?;
            let speed = stat(view.get(speed_at)?, "pickaxe.speed")?;
            #[allow(clippy::cast_precision_loss)]
            let cost = (strength as f64 * speed as f64).sqrt();
            Ok(vec![Value::Float(cost)])
        })?;
        Ok(pick)
    }

    /// Raises strength and speed by one in a single write; the lore
    /// follows.
    ///
    /// # Errors
    ///
    /// Fails for destroyed pickaxes, and with `InvalidArgument` when a stat
    /// is already `i64::MAX`; nothing is written then.
    pub fn upgrade(runtime: &mut Runtime, pick: ComponentHandle) -> Result<()> {
        let keys = Keys::resolve(runtime)?;
        let world = runtime.world_mut();
        let strength = raised(stat(&pick.get(world, keys.strength)?, "pickaxe.strength")?, "strength")?;
        let speed = raised(stat(&pick.get(world, keys.speed)?, "pickaxe.speed")?, "speed")?;
        world.set_fields(
            pick.entity(),
            &[
                (keys.strength_at(), Value::Int(strength)),
                (keys.speed_at(), Value::Int(speed)),
            ],
        )?;
        tracing::debug!(item = ?pick.entity(), strength, speed, "upgraded pickaxe");
        Ok(())
    }
}

impl Plugin for PickaxePlugin {
    fn name(&self) -> &str {
        "pickaxe"
    }

    fn load(&self, runtime: &mut Runtime) -> Result<()> {
        let b = runtime.builtins();
        let world = runtime.world_mut();
        let pickaxe = world.intern("pickaxe");
        let strength = world.intern("strength");
        let speed = world.intern("speed");
        world.register_component(
            ComponentSchema::new(pickaxe)
                .embedding(b.item)
                .with_field(FieldSchema::required(strength, Type::Int))
                .with_field(FieldSchema::required(speed, Type::Int)),
        )?;
        let keys = Keys::resolve(runtime)?;

        let settings = self.settings.clone();
        runtime.on(PLAYER_JOIN, "pickaxe/give", move |rt, event| {
            let Some(player) = event.player() else {
                return Ok(());
            };
            let pick = Self::create(rt, settings.strength, settings.speed, &settings.name)?;
            rt.give_item(player, pick)?;
            let name = rt.player_name(player)?;
            rt.broadcast(&format("&c${} &fjoined!", None, &[Value::from(name)])?);
            Ok(())
        });

        let settings = self.settings.clone();
        runtime.on(PLAYER_BREAK_BLOCK, "pickaxe/break", move |rt, event| {
            let Some(player) = event.player() else {
                return Ok(());
            };
            let Some(held) = rt.held_item(player)? else {
                return Ok(());
            };
            let Some(pick) = rt.world().cast(held, keys.pickaxe)? else {
                return Ok(());
            };

            let block = event
                .get(b.block)
                .and_then(Value::as_str)
                .ok_or_else(|| Error::missing_key(PLAYER_BREAK_BLOCK, "block"))?
                .to_string();
            let strength = stat(&pick.get(rt.world(), keys.strength)?, "pickaxe.strength")?;
            if strength < rt.lookup(&settings.strength_table, &block)? {
                event.cancel();
            }

            let roll = settings.upgrade_roll;
            if rt.random_int(0, roll)? == roll {
                Self::upgrade(rt, pick)?;
                rt.publish(
                    Event::new(ITEM_UPGRADED)
                        .with_player(player)
                        .with_target(pick.entity()),
                )?;
            }
            Ok(())
        });

        runtime.on(ITEM_UPGRADED, "pickaxe/announce", |rt, event| {
            let (Some(player), Some(item)) = (event.player(), event.target()) else {
                return Ok(());
            };
            let text = format(
                "&aYour ${item.name} was upgraded!",
                Some(&rt.world().get(item)?),
                &[],
            )?;
            rt.send_message(player, text);
            Ok(())
        });

        Ok(())
    }
}
