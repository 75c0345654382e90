//! Feji CLI entry point.
//!
//! Runs a scripted session against the bundled plugins: one player joins,
//! then breaks the given blocks in turn.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use feji_runtime::{PickaxePlugin, Plugin, PluginConfig, Runtime, RuntimeConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Plugin configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed; overrides the config file
    #[arg(short, long)]
    seed: Option<u64>,

    /// Name of the simulated player
    #[arg(short, long, default_value = "Steve")]
    player: String,

    /// Blocks to break, in order
    #[arg(short, long = "block", default_values_t = [String::from("stone")])]
    blocks: Vec<String>,

    /// Times to break each block
    #[arg(long, default_value_t = 1)]
    breaks: usize,

    /// Log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => PluginConfig::load(path)?,
        None => default_config()?,
    };

    let mut runtime = Runtime::new(RuntimeConfig::new().with_seed(cli.seed.unwrap_or(0)))?;
    runtime.apply_config(&config);
    if let Some(seed) = cli.seed {
        runtime = runtime.with_random(feji_stdlib::SeededRandom::new(seed));
    }

    let pickaxe = PickaxePlugin::from_config(&config)?;
    if config.is_enabled(pickaxe.name()) {
        runtime.load(&pickaxe)?;
    }

    let player = runtime.spawn_player(&cli.player)?;
    report(&runtime.player_join(player)?);

    for block in &cli.blocks {
        for _ in 0..cli.breaks {
            let outcome = runtime.break_block(player, block)?;
            let verdict = if outcome.cancelled() { "kept" } else { "broken" };
            println!("{block}: {verdict}");
            report(&outcome);
        }
    }

    if let Some(item) = runtime.held_item(player)? {
        let b = runtime.builtins();
        let name = runtime.world().read(item, b.item_name())?;
        let lore = runtime.world().read(item, b.item_lore())?;
        println!("\n[{name}]\n{lore}");
    }

    let messages = runtime.take_messages();
    if !messages.is_empty() {
        println!();
    }
    for message in messages {
        println!("> {}", message.text);
    }
    Ok(())
}

/// Block strengths used when no config file is given.
fn default_config() -> Result<PluginConfig, Box<dyn Error>> {
    Ok(PluginConfig::from_toml_str(
        "[tables.block-strength]\ngrass = 1\ndirt = 1\nstone = 1\niron-ore = 2\nobsidian = 9\n",
    )?)
}

fn report(outcome: &feji_events::DispatchReport) {
    for failure in &outcome.failures {
        eprintln!("\x1b[33mhandler {} failed: {}\x1b[0m", failure.handler, failure.error);
    }
}
