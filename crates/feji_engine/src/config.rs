//! Configuration for a [`World`](crate::World).

/// Limits applied by a world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    /// Maximum number of bindings registered on one entity.
    pub max_bindings_per_entity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_bindings_per_entity: 256,
        }
    }
}

impl WorldConfig {
    /// Creates a configuration with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the per-entity binding limit.
    #[must_use]
    pub const fn with_max_bindings_per_entity(mut self, limit: usize) -> Self {
        self.max_bindings_per_entity = limit;
        self
    }
}
