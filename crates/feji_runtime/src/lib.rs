//! Plugin runtime for Feji.
//!
//! This crate provides:
//! - [`Runtime`] - A world, an event bus over it, and the host collaborators
//! - [`Plugin`] - The seam plugins implement
//! - [`PluginConfig`] - Operator configuration loaded from TOML
//! - [`PickaxePlugin`] - The bundled pickaxe plugin

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod pickaxe;
pub mod plugin;
pub mod runtime;

pub use config::{PluginConfig, RuntimeConfig};
pub use pickaxe::{PickaxePlugin, PickaxeSettings};
pub use plugin::Plugin;
pub use runtime::{Builtins, ITEM_UPGRADED, Message, PLAYER_BREAK_BLOCK, PLAYER_JOIN, Runtime};
