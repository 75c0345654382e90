//! The pickaxe plugin end to end: config, join, breaks, upgrades.

use feji_runtime::{PickaxePlugin, PluginConfig, Runtime, RuntimeConfig};
use feji_stdlib::ScriptedRandom;

const CONFIG: &str = r#"
plugins = ["pickaxe"]

[tables.block-strength]
stone = 1
iron-ore = 2
obsidian = 9

[settings.pickaxe]
name = "Pickaexe"
upgrade-roll = 3
"#;

fn runtime(rolls: &[i64]) -> Runtime {
    let config = PluginConfig::from_toml_str(CONFIG).unwrap();
    let mut runtime = Runtime::new(RuntimeConfig::default())
        .unwrap()
        .with_random(ScriptedRandom::new(rolls.iter().copied()));
    runtime.apply_config(&config);
    runtime.load(&PickaxePlugin::from_config(&config).unwrap()).unwrap();
    runtime
}

fn lore(runtime: &Runtime, player: feji_foundation::EntityId) -> String {
    let pick = runtime.held_item(player).unwrap().unwrap();
    runtime
        .world()
        .read(pick, runtime.builtins().item_lore())
        .unwrap()
        .to_string()
}

#[test]
fn upgrade_unlocks_harder_blocks() {
    let mut runtime = runtime(&[0, 3, 0]);
    let player = runtime.spawn_player("Alex").unwrap();
    runtime.player_join(player).unwrap();

    // Strength 1 cannot break iron; the max roll upgrades afterwards.
    assert!(runtime.break_block(player, "iron-ore").unwrap().cancelled());
    assert!(runtime.break_block(player, "iron-ore").unwrap().cancelled());
    assert_eq!(lore(&runtime, player), "Strength: 2\nSpeed: 2\nCost: 2");

    assert!(!runtime.break_block(player, "iron-ore").unwrap().cancelled());
}

#[test]
fn every_player_gets_their_own_pickaxe() {
    let mut runtime = runtime(&[3]);
    let alex = runtime.spawn_player("Alex").unwrap();
    let sam = runtime.spawn_player("Sam").unwrap();
    runtime.player_join(alex).unwrap();
    runtime.player_join(sam).unwrap();

    runtime.break_block(alex, "stone").unwrap();

    assert_eq!(lore(&runtime, alex), "Strength: 2\nSpeed: 2\nCost: 2");
    assert_eq!(lore(&runtime, sam), "Strength: 1\nSpeed: 1\nCost: 1");
}

#[test]
fn join_announcement_reaches_everyone_online() {
    let mut runtime = runtime(&[]);
    let alex = runtime.spawn_player("Alex").unwrap();
    runtime.player_join(alex).unwrap();
    let sam = runtime.spawn_player("Sam").unwrap();
    runtime.take_messages();

    runtime.player_join(sam).unwrap();

    let messages = runtime.take_messages();
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.text == "&cSam &fjoined!"));
}

#[test]
fn disabled_plugins_are_visible_in_config() {
    let config = PluginConfig::from_toml_str(CONFIG).unwrap();
    assert!(config.is_enabled("pickaxe"));
    assert!(!config.is_enabled("sword"));
}
