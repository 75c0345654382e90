//! Multi-threaded hosts serialize access through a lock around the runtime.

use std::sync::{Arc, Mutex};
use std::thread;

use feji_runtime::{PickaxePlugin, Runtime, RuntimeConfig};
use feji_stdlib::LookupTable;

#[test]
fn runtime_behind_a_mutex() {
    let mut runtime = Runtime::new(RuntimeConfig::new().with_seed(11)).unwrap();
    runtime.add_table(LookupTable::new("block-strength").with("stone", 1));
    runtime.load(&PickaxePlugin::new()).unwrap();
    let players: Vec<_> = ["Alex", "Sam", "Kim", "Jo"]
        .iter()
        .map(|name| runtime.spawn_player(name).unwrap())
        .collect();
    let runtime = Arc::new(Mutex::new(runtime));

    let workers: Vec<_> = players
        .iter()
        .map(|&player| {
            let runtime = Arc::clone(&runtime);
            thread::spawn(move || {
                let mut rt = runtime.lock().unwrap();
                rt.player_join(player).unwrap();
                for _ in 0..10 {
                    assert!(rt.break_block(player, "stone").unwrap().is_clean());
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let rt = runtime.lock().unwrap();
    for player in players {
        let pick = rt.held_item(player).unwrap().unwrap();
        let lore = rt.world().read(pick, rt.builtins().item_lore()).unwrap().to_string();
        assert!(lore.starts_with("Strength: "), "{lore}");
    }
}
