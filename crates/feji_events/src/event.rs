//! Events and their context records.

use std::fmt;
use std::sync::Arc;

use feji_foundation::{EntityId, KeywordId, PMap, Value};

/// Name of an event type, e.g. `player-break-block`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKind(Arc<str>);

impl EventKind {
    /// Creates a kind from its name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// The kind's name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Debug for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventKind({})", self.0)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One published event: its kind, the context the host supplied, and the
/// cancellation flag every handler shares.
#[derive(Clone, Debug)]
pub struct Event {
    kind: EventKind,
    context: PMap<KeywordId, Value>,
    cancelled: bool,
}

impl Event {
    /// Creates an un-cancelled event with an empty context.
    #[must_use]
    pub fn new(kind: impl Into<EventKind>) -> Self {
        Self {
            kind: kind.into(),
            context: PMap::new(),
            cancelled: false,
        }
    }

    /// Adds a context entry, builder style.
    #[must_use]
    pub fn with(mut self, key: KeywordId, value: impl Into<Value>) -> Self {
        self.context.set(key, value.into());
        self
    }

    /// Sets the acting player.
    #[must_use]
    pub fn with_player(self, player: EntityId) -> Self {
        self.with(KeywordId::PLAYER, player)
    }

    /// Sets the affected object.
    #[must_use]
    pub fn with_target(self, target: EntityId) -> Self {
        self.with(KeywordId::TARGET, target)
    }

    /// The event type.
    #[must_use]
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// A context entry.
    #[must_use]
    pub fn get(&self, key: KeywordId) -> Option<&Value> {
        self.context.get(&key)
    }

    /// Adds or replaces a context entry.
    pub fn set(&mut self, key: KeywordId, value: impl Into<Value>) {
        self.context.set(key, value.into());
    }

    /// The acting player, if the host supplied one.
    #[must_use]
    pub fn player(&self) -> Option<EntityId> {
        self.get(KeywordId::PLAYER).and_then(Value::as_entity)
    }

    /// The affected object, if the host supplied one.
    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        self.get(KeywordId::TARGET).and_then(Value::as_entity)
    }

    /// Asks the host not to carry out the triggering action. Later handlers
    /// still run.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Whether any handler cancelled the event.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}
