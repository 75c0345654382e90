//! Event dispatch for Feji.
//!
//! This crate provides:
//! - [`Event`] - An event kind, its context record, and the cancellation flag
//! - [`EventBus`] - Handlers keyed by kind, run in registration order
//! - [`Dispatch`] - The `Pending -> Running(i) -> Completed` state machine
//! - [`EventHost`] - Publication with nested, depth-first dispatch

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bus;
pub mod dispatch;
pub mod event;

pub use bus::{BusConfig, EventBus, EventHost, Handler, RegisteredHandler};
pub use dispatch::{Dispatch, DispatchReport, DispatchState, HandlerFailure};
pub use event::{Event, EventKind};
