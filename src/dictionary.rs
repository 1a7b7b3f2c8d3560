//! Dictionary Store
//!
//! In-memory word/meaning map served by the reference server.
//!
//! ## Concurrency
//! `HashMap` behind a `parking_lot::RwLock`: lookups share the read lock,
//! add/remove take the write lock. Each request touches the map once, so no
//! lock is held across network I/O.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Thread-safe word store
#[derive(Debug, Default)]
pub struct Dictionary {
    words: RwLock<HashMap<String, String>>,
}

impl Dictionary {
    /// Create an empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Meaning of `word`, if present (read lock)
    pub fn get(&self, word: &str) -> Option<String> {
        self.words.read().get(word).cloned()
    }

    /// Insert or replace a meaning (write lock)
    ///
    /// Returns `true` if the word was new.
    pub fn insert(&self, word: String, meaning: String) -> bool {
        self.words.write().insert(word, meaning).is_none()
    }

    /// Remove a word (write lock)
    ///
    /// Returns `true` if the word was present.
    pub fn remove(&self, word: &str) -> bool {
        self.words.write().remove(word).is_some()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.read().contains_key(word)
    }

    /// Number of words stored
    pub fn len(&self) -> usize {
        self.words.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.read().is_empty()
    }
}

impl<W, M> FromIterator<(W, M)> for Dictionary
where
    W: Into<String>,
    M: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (W, M)>>(iter: I) -> Self {
        let words = iter
            .into_iter()
            .map(|(w, m)| (w.into(), m.into()))
            .collect();
        Self {
            words: RwLock::new(words),
        }
    }
}
