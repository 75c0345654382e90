//! Collaborators plugin code calls into.
//!
//! This crate provides:
//! - [`format()`] and [`Template`] - `${}` interpolation over entity fields
//! - [`LookupTable`] - Configured key to threshold mappings
//! - [`RandomSource`] - Inclusive random integers, seeded or scripted

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod format;
pub mod lookup;
pub mod random;

pub use format::{Template, format};
pub use lookup::LookupTable;
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
