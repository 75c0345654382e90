//! Runtime and plugin configuration.
//!
//! [`RuntimeConfig`] is built in code. [`PluginConfig`] is what a server
//! operator edits: a TOML file with lookup tables, the plugin list and
//! per-plugin settings.
//!
//! ```toml
//! seed = 7
//! plugins = ["pickaxe"]
//!
//! [tables.block-strength]
//! grass = 1
//! stone = 1
//! obsidian = 9
//!
//! [settings.pickaxe]
//! name = "Pickaexe"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use feji_engine::WorldConfig;
use feji_events::BusConfig;
use feji_foundation::{Error, ErrorKind, Result};
use feji_stdlib::LookupTable;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Settings for a [`Runtime`](crate::Runtime).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Limits for the world.
    pub world: WorldConfig,
    /// Limits for the event bus.
    pub bus: BusConfig,
    /// Seed for the random source.
    pub seed: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            bus: BusConfig::default(),
            seed: 0,
        }
    }
}

impl RuntimeConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set world limits.
    #[must_use]
    pub fn with_world(mut self, world: WorldConfig) -> Self {
        self.world = world;
        self
    }

    /// Builder method to set bus limits.
    #[must_use]
    pub fn with_bus(mut self, bus: BusConfig) -> Self {
        self.bus = bus;
        self
    }

    /// Builder method to set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Operator-facing plugin configuration, loaded from TOML.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Overrides [`RuntimeConfig::seed`] when set.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Plugins to load. Empty means every bundled plugin.
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Lookup tables by name.
    #[serde(default)]
    pub tables: BTreeMap<String, BTreeMap<String, i64>>,

    /// Free-form settings by plugin name.
    #[serde(default)]
    pub settings: BTreeMap<String, toml::Value>,
}

impl PluginConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// `Config` errors for malformed documents.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| Error::new(ErrorKind::Config(e.to_string())))
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// `Config` errors for unreadable or malformed files.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::new(ErrorKind::Config(format!("{}: {e}", path.display())))
        })?;
        Self::from_toml_str(&source).map_err(|e| e.in_frame(path.display().to_string()))
    }

    /// Serializes back to TOML.
    ///
    /// # Errors
    ///
    /// `Config` errors if a value has no TOML form.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::new(ErrorKind::Config(e.to_string())))
    }

    /// True if `plugin` should be loaded.
    #[must_use]
    pub fn is_enabled(&self, plugin: &str) -> bool {
        self.plugins.is_empty() || self.plugins.iter().any(|p| p == plugin)
    }

    /// The configured lookup tables.
    pub fn lookup_tables(&self) -> impl Iterator<Item = LookupTable> + '_ {
        self.tables.iter().map(|(name, entries)| {
            let mut table = LookupTable::new(name.clone());
            table.extend(entries.iter().map(|(k, v)| (k.clone(), *v)));
            table
        })
    }

    /// Typed settings for one plugin; defaults when the section is absent.
    ///
    /// # Errors
    ///
    /// `Config` errors if the section does not match `T`.
    pub fn settings<T: DeserializeOwned + Default>(&self, plugin: &str) -> Result<T> {
        match self.settings.get(plugin) {
            None => Ok(T::default()),
            Some(value) => value.clone().try_into().map_err(|e: toml::de::Error| {
                Error::new(ErrorKind::Config(format!("settings.{plugin}: {e}")))
            }),
        }
    }
}
