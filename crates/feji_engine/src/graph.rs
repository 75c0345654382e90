//! Per-entity dependency graph of bindings.
//!
//! Nodes are fields; every binding adds an edge from each of its sources to
//! its target. Each field is the target of at most one binding, and the
//! graph is kept acyclic by checking every insertion.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use feji_storage::FieldRef;

use crate::binding::Binding;

/// The bindings registered on one entity, in registration order.
#[derive(Clone, Debug, Default)]
pub struct BindingGraph {
    entries: Vec<Binding>,
}

impl BindingGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no binding is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The binding that derives `target`, if any.
    #[must_use]
    pub fn get(&self, target: FieldRef) -> Option<&Binding> {
        self.entries.iter().find(|b| b.target == target)
    }

    /// True if `field` is written by a binding.
    #[must_use]
    pub fn is_derived(&self, field: FieldRef) -> bool {
        self.get(field).is_some()
    }

    /// Bindings in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.entries.iter()
    }

    /// Looks for the cycle `candidate` would close.
    ///
    /// Any existing binding on the same target is ignored, since inserting
    /// the candidate replaces it. Returns the cycle as a field path that
    /// starts and ends at the candidate's target.
    #[must_use]
    pub fn find_cycle(&self, candidate: &Binding) -> Option<Vec<FieldRef>> {
        let target = candidate.target;
        if candidate.depends_on(target) {
            return Some(vec![target, target]);
        }

        let mut parent: HashMap<FieldRef, FieldRef> = HashMap::new();
        let mut seen = HashSet::from([target]);
        let mut stack = vec![target];
        while let Some(field) = stack.pop() {
            if field != target && candidate.depends_on(field) {
                let mut path = vec![field];
                let mut cursor = field;
                while let Some(&prev) = parent.get(&cursor) {
                    path.push(prev);
                    cursor = prev;
                }
                path.reverse();
                path.push(target);
                return Some(path);
            }
            for next in self
                .entries
                .iter()
                .filter(|b| b.target != target && b.depends_on(field))
            {
                if seen.insert(next.target) {
                    parent.insert(next.target, field);
                    stack.push(next.target);
                }
            }
        }
        None
    }

    /// Adds a binding, returning the one it replaced.
    ///
    /// The caller is expected to have run [`BindingGraph::find_cycle`]; a
    /// replacement moves to the end of the registration order.
    pub fn insert(&mut self, binding: Binding) -> Option<Binding> {
        let replaced = self.remove(binding.target);
        self.entries.push(binding);
        replaced
    }

    /// Removes the binding that derives `target`.
    pub fn remove(&mut self, target: FieldRef) -> Option<Binding> {
        let pos = self.entries.iter().position(|b| b.target == target)?;
        Some(self.entries.remove(pos))
    }

    /// Bindings to rerun after `changed` were written, in dependency order.
    #[must_use]
    pub fn plan(&self, changed: &[FieldRef]) -> Vec<Binding> {
        let seeds = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, b)| changed.iter().any(|&f| b.depends_on(f)))
            .map(|(i, _)| i);
        self.schedule(seeds)
    }

    /// The bindings deriving `targets` plus everything downstream of them.
    #[must_use]
    pub fn plan_targets(&self, targets: &[FieldRef]) -> Vec<Binding> {
        let seeds = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, b)| targets.contains(&b.target))
            .map(|(i, _)| i);
        self.schedule(seeds)
    }

    /// Every binding, in dependency order.
    #[must_use]
    pub fn plan_all(&self) -> Vec<Binding> {
        self.schedule(0..self.entries.len())
    }

    /// Expands `seeds` to their downstream closure and sorts it
    /// topologically. Among bindings that are ready at the same time, the
    /// earliest registered runs first.
    fn schedule(&self, seeds: impl IntoIterator<Item = usize>) -> Vec<Binding> {
        let n = self.entries.len();
        let mut affected = vec![false; n];
        let mut queue: VecDeque<usize> = VecDeque::new();
        for i in seeds {
            if !affected[i] {
                affected[i] = true;
                queue.push_back(i);
            }
        }
        while let Some(i) = queue.pop_front() {
            let produced = self.entries[i].target;
            for (j, b) in self.entries.iter().enumerate() {
                if !affected[j] && b.depends_on(produced) {
                    affected[j] = true;
                    queue.push_back(j);
                }
            }
        }

        let mut indegree = vec![0usize; n];
        for j in (0..n).filter(|&j| affected[j]) {
            indegree[j] = (0..n)
                .filter(|&i| affected[i] && self.entries[j].depends_on(self.entries[i].target))
                .count();
        }

        let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
            .filter(|&i| affected[i] && indegree[i] == 0)
            .map(Reverse)
            .collect();
        let mut order = Vec::with_capacity(n);
        while let Some(Reverse(i)) = ready.pop() {
            order.push(self.entries[i].clone());
            let produced = self.entries[i].target;
            for j in (0..n).filter(|&j| affected[j]) {
                if self.entries[j].depends_on(produced) {
                    indegree[j] -= 1;
                    if indegree[j] == 0 {
                        ready.push(Reverse(j));
                    }
                }
            }
        }
        debug_assert_eq!(
            order.len(),
            affected.iter().filter(|&&a| a).count(),
            "binding graph contains a cycle"
        );
        order
    }
}
