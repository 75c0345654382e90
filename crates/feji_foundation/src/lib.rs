//! Core types, values, and persistent collections for Feji.
//!
//! This crate provides:
//! - [`Value`] - The dynamic value type stored in component fields
//! - [`EntityId`] - Generational entity identifiers
//! - [`Type`] - Field type descriptors for schema validation
//! - [`Error`] - Rich error types with context
//! - Persistent collections ([`PVec`], [`PMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod entity;
pub mod error;
pub mod intern;
pub mod types;
pub mod value;

pub use collections::{PMap, PVec};
pub use entity::EntityId;
pub use error::{Error, ErrorContext, ErrorKind, Limit};
pub use intern::{Interner, KeywordId};
pub use types::Type;
pub use value::Value;

/// Result type alias using Feji's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
