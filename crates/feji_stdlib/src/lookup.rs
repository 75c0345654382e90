//! Read-only lookup tables supplied by plugin configuration.

use std::collections::BTreeMap;

use feji_foundation::{Error, Result};

/// Named mapping from identifier text to a numeric threshold, such as
/// block name to the strength needed to break it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LookupTable {
    name: String,
    entries: BTreeMap<String, i64>,
}

impl LookupTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Adds an entry, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: i64) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    /// Table name, used in error messages.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a key. Absent keys are an error, never a default.
    ///
    /// # Errors
    ///
    /// `MissingKey` when the table has no entry for `key`.
    pub fn get(&self, key: &str) -> Result<i64> {
        self.entries
            .get(key)
            .copied()
            .ok_or_else(|| Error::missing_key(&self.name, key))
    }

    /// True if the table has an entry for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> Extend<(K, i64)> for LookupTable {
    fn extend<I: IntoIterator<Item = (K, i64)>>(&mut self, iter: I) {
        self.entries
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v)));
    }
}
