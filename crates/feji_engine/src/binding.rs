//! Reactive bindings: a derived field plus the fields it is computed from.

use std::fmt;
use std::sync::Arc;

use feji_foundation::{Result, Value};
use feji_storage::{EntityView, FieldRef};

/// Recompute function of a binding.
///
/// Receives the entity as it stands when the binding runs and returns the
/// new value of the target field. It must depend only on what it reads from
/// the view.
pub type ComputeFn = Arc<dyn Fn(&EntityView<'_>) -> Result<Value> + Send + Sync>;

/// A derived field and how to compute it.
#[derive(Clone)]
pub struct Binding {
    /// The derived field.
    pub target: FieldRef,
    /// Fields the target is computed from, in declaration order.
    pub sources: Vec<FieldRef>,
    compute: ComputeFn,
}

impl Binding {
    /// Creates a binding. Repeated sources are collapsed.
    pub fn new<F>(target: FieldRef, sources: impl IntoIterator<Item = FieldRef>, compute: F) -> Self
    where
        F: Fn(&EntityView<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        let mut unique = Vec::new();
        for source in sources {
            if !unique.contains(&source) {
                unique.push(source);
            }
        }
        Self {
            target,
            sources: unique,
            compute: Arc::new(compute),
        }
    }

    /// True if `field` is one of the sources.
    #[must_use]
    pub fn depends_on(&self, field: FieldRef) -> bool {
        self.sources.contains(&field)
    }

    /// Runs the recompute function.
    ///
    /// # Errors
    ///
    /// Whatever the compute function reports.
    pub fn compute(&self, view: &EntityView<'_>) -> Result<Value> {
        (self.compute)(view)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("target", &self.target)
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}
