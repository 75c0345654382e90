//! Component schemas, composition table, and entity records for Feji.
//!
//! This crate provides:
//! - [`ComponentSchema`] - Declared fields and embedded components
//! - [`ComponentTable`] - Registered component types and their composition sets
//! - [`EntityStore`] - Generational ownership of entity records
//! - [`EntityView`] - Read-only view of one entity's fields

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod component;
pub mod entity;
pub mod schema;
pub mod table;
pub mod view;

pub use component::{Archetype, Component, EntityRecord, FieldRef};
pub use entity::EntityStore;
pub use schema::{ComponentSchema, FieldSchema};
pub use table::ComponentTable;
pub use view::EntityView;
