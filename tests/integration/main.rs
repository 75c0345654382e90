//! Cross-layer integration tests for Feji
//!
//! Tests that verify correct interaction between the runtime, the event bus,
//! and the reactive world.

mod pickaxe;
mod plugins;
mod threading;
