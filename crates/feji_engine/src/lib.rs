//! Reactive binding engine and capability casts for Feji.
//!
//! This crate provides:
//! - [`World`] - Entity creation, field writes, and synchronous propagation
//! - [`Binding`] - A derived field and the function that computes it
//! - [`BindingGraph`] - Per-entity dependency graph with cycle checks
//! - [`CapabilityRegistry`] - Narrowing references to component handles

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod binding;
pub mod capability;
pub mod config;
pub mod graph;
pub mod world;

pub use binding::{Binding, ComputeFn};
pub use capability::{CapabilityRegistry, ComponentHandle, EntityRef};
pub use config::WorldConfig;
pub use graph::BindingGraph;
pub use world::World;
