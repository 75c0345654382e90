//! Handler registry and the publish entry point.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use feji_foundation::{Error, ErrorKind, Limit, Result};

use crate::dispatch::{Dispatch, DispatchReport};
use crate::event::{Event, EventKind};

/// An event handler. `C` is the host the handler may act on, typically
/// the plugin runtime that owns the bus.
pub type Handler<C> = Arc<dyn Fn(&mut C, &mut Event) -> Result<()> + Send + Sync>;

/// A handler together with the name used in logs and error frames.
pub struct RegisteredHandler<C> {
    /// Display name, e.g. `pickaxe/break-block`.
    pub name: Arc<str>,
    /// The handler itself.
    pub handler: Handler<C>,
}

impl<C> Clone for RegisteredHandler<C> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<C> fmt::Debug for RegisteredHandler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RegisteredHandler").field(&self.name).finish()
    }
}

/// Limits applied by a bus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BusConfig {
    /// Maximum depth of nested publication.
    pub max_depth: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { max_depth: 16 }
    }
}

impl BusConfig {
    /// Creates a configuration with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the nesting limit.
    #[must_use]
    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Handlers keyed by event kind, run in registration order.
pub struct EventBus<C> {
    handlers: HashMap<EventKind, Vec<RegisteredHandler<C>>>,
    /// Kinds currently being dispatched, outermost first.
    active: Vec<EventKind>,
    config: BusConfig,
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

impl<C> fmt::Debug for EventBus<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("kinds", &self.handlers.len())
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl<C> EventBus<C> {
    /// Creates a bus with no handlers.
    #[must_use]
    pub fn new(config: BusConfig) -> Self {
        Self {
            handlers: HashMap::new(),
            active: Vec::new(),
            config,
        }
    }

    /// Adds a handler for `kind`. Handlers cannot be removed.
    pub fn register<F>(&mut self, kind: impl Into<EventKind>, name: &str, handler: F)
    where
        F: Fn(&mut C, &mut Event) -> Result<()> + Send + Sync + 'static,
    {
        let kind = kind.into();
        tracing::debug!(event = %kind, handler = name, "registered handler");
        self.handlers
            .entry(kind)
            .or_default()
            .push(RegisteredHandler {
                name: Arc::from(name),
                handler: Arc::new(handler),
            });
    }

    /// Number of handlers for `kind`.
    #[must_use]
    pub fn handler_count(&self, kind: &EventKind) -> usize {
        self.handlers.get(kind).map_or(0, Vec::len)
    }

    /// Current nesting depth; zero outside any dispatch.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.active.len()
    }

    /// True while a dispatch of `kind` is running.
    #[must_use]
    pub fn is_dispatching(&self, kind: &EventKind) -> bool {
        self.active.contains(kind)
    }

    /// Starts a dispatch: takes a snapshot of the handlers and marks the
    /// kind active. Pair every successful call with [`EventBus::finish`].
    ///
    /// # Errors
    ///
    /// `ReentrantPublish` while a dispatch of the same kind is running;
    /// `LimitExceeded` past the nesting limit.
    pub fn begin(&mut self, event: Event) -> Result<Dispatch<C>> {
        if self.is_dispatching(event.kind()) {
            tracing::warn!(event = %event.kind(), "rejected re-entrant publish");
            return Err(Error::new(ErrorKind::ReentrantPublish(
                event.kind().to_string(),
            )));
        }
        if self.active.len() >= self.config.max_depth {
            return Err(Error::limit_exceeded(Limit::DispatchDepth {
                limit: self.config.max_depth,
            }));
        }
        let handlers = self.handlers.get(event.kind()).cloned().unwrap_or_default();
        tracing::debug!(
            event = %event.kind(),
            handlers = handlers.len(),
            depth = self.active.len(),
            "dispatching"
        );
        self.active.push(event.kind().clone());
        Ok(Dispatch::new(event, handlers))
    }

    /// Ends a dispatch started with [`EventBus::begin`].
    pub fn finish(&mut self, dispatch: Dispatch<C>) -> DispatchReport {
        let report = dispatch.into_report();
        if let Some(pos) = self.active.iter().rposition(|k| k == report.event.kind()) {
            self.active.remove(pos);
        }
        report
    }
}

/// A host that owns an [`EventBus`] over itself.
///
/// Handlers get `&mut` access to the host, so they can mutate entities
/// and publish follow-up events. A nested publication runs to completion
/// before the handler that made it continues.
pub trait EventHost: Sized {
    /// The host's bus.
    fn bus(&self) -> &EventBus<Self>;

    /// The host's bus, mutably.
    fn bus_mut(&mut self) -> &mut EventBus<Self>;

    /// Runs every handler for the event's kind, in registration order.
    ///
    /// Handler failures are logged and collected in the report; they do
    /// not stop later handlers.
    ///
    /// # Errors
    ///
    /// See [`EventBus::begin`].
    fn publish(&mut self, event: Event) -> Result<DispatchReport> {
        let mut dispatch = self.bus_mut().begin(event)?;
        dispatch.run(self);
        Ok(self.bus_mut().finish(dispatch))
    }
}
