//! Feji - entity, component, and reactive binding kernel for game-server
//! plugins.
//!
//! This crate re-exports all layers of the Feji system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 4: feji_runtime    - Plugin runtime, configuration, CLI
//!          feji_stdlib     - Formatting, lookup tables, randomness
//! Layer 3: feji_events     - Event bus and dispatch state machine
//! Layer 2: feji_engine     - World, reactive bindings, capability casts
//! Layer 1: feji_storage    - Component schemas, composition, entity records
//! Layer 0: feji_foundation - Core types (Value, EntityId, Error)
//! ```

pub use feji_engine as engine;
pub use feji_events as events;
pub use feji_foundation as foundation;
pub use feji_runtime as runtime;
pub use feji_stdlib as stdlib;
pub use feji_storage as storage;
