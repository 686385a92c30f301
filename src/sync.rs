//! A trie shared between threads.
//!
//! [`PrefixTrie`] itself assumes a single writer with no concurrent lookups:
//! a lookup racing a split could see a truncated edge with its children
//! detached. [`SharedPrefixTrie`] puts the whole trie behind one
//! reader-writer lock, so every insert and lookup is atomic with respect to
//! the others. Lock hold time is bounded by key length, not table size.

use parking_lot::{RwLock, RwLockReadGuard};

use crate::bits::BitString;
use crate::error::InsertError;
use crate::PrefixTrie;

pub struct SharedPrefixTrie<V> {
    inner: RwLock<PrefixTrie<V>>,
}

impl<V> SharedPrefixTrie<V> {
    pub fn new() -> Self {
        Self::from_trie(PrefixTrie::new())
    }

    pub fn from_trie(trie: PrefixTrie<V>) -> Self {
        Self {
            inner: RwLock::new(trie),
        }
    }

    /// See [`PrefixTrie::insert`].
    pub fn insert(&self, prefix: &BitString, value: V) -> Result<(), InsertError<V>> {
        self.inner.write().insert(prefix, value)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Holds the read lock for several lookups in a row.
    pub fn read(&self) -> RwLockReadGuard<'_, PrefixTrie<V>> {
        self.inner.read()
    }

    pub fn into_inner(self) -> PrefixTrie<V> {
        self.inner.into_inner()
    }
}

impl<V: Clone> SharedPrefixTrie<V> {
    /// See [`PrefixTrie::longest_match`]. The value is cloned out so the lock
    /// is released before returning.
    pub fn longest_match(&self, key: &BitString) -> Option<V> {
        self.inner.read().longest_match(key).cloned()
    }
}

impl<V> Default for SharedPrefixTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> From<PrefixTrie<V>> for SharedPrefixTrie<V> {
    fn from(trie: PrefixTrie<V>) -> Self {
        Self::from_trie(trie)
    }
}
