//! Keyword interning.
//!
//! Component names, field names and event kinds are all keywords. Interning
//! them turns every name comparison on the hot path into an integer compare.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interned keyword identifier.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeywordId(pub(crate) u32);

impl KeywordId {
    /// Returns the raw index of this keyword.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    // Reserved keywords, interned by `Interner::new` at fixed indices.

    /// Event context key for the acting player: `player`
    pub const PLAYER: KeywordId = KeywordId(0);

    /// Event context key for the affected object: `target`
    pub const TARGET: KeywordId = KeywordId(1);
}

impl fmt::Debug for KeywordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeywordId({})", self.0)
    }
}

/// Two-way map between keyword text and [`KeywordId`].
///
/// Not thread-safe; the owning world serializes access.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interner {
    names: Vec<Arc<str>>,
    ids: HashMap<Arc<str>, KeywordId>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    const RESERVED: &'static [&'static str] = &["player", "target"];

    /// Creates an interner with the reserved keywords already present.
    #[must_use]
    pub fn new() -> Self {
        let mut interner = Self {
            names: Vec::new(),
            ids: HashMap::new(),
        };
        for (i, name) in Self::RESERVED.iter().enumerate() {
            let id = interner.intern(name);
            debug_assert_eq!(id.0 as usize, i, "reserved keyword {name} out of place");
        }
        interner
    }

    /// Interns `name`, returning the existing id if it was seen before.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` keywords are interned.
    pub fn intern(&mut self, name: &str) -> KeywordId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = KeywordId(u32::try_from(self.names.len()).expect("too many keywords"));
        let name: Arc<str> = name.into();
        self.names.push(name.clone());
        self.ids.insert(name, id);
        id
    }

    /// Looks up an already-interned keyword without interning it.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<KeywordId> {
        self.ids.get(name).copied()
    }

    /// Returns the text of a keyword.
    #[must_use]
    pub fn resolve(&self, id: KeywordId) -> Option<&str> {
        self.names.get(id.0 as usize).map(AsRef::as_ref)
    }

    /// Returns the text of a keyword, or a placeholder for foreign ids.
    ///
    /// Used when building error messages and log fields.
    #[must_use]
    pub fn display(&self, id: KeywordId) -> String {
        self.resolve(id)
            .map_or_else(|| format!("<kw {}>", id.0), ToString::to_string)
    }

    /// Returns the number of interned keywords.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing has been interned (never true after `new`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
