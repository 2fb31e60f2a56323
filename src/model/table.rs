//! Read-only associative container for captured process tables.
//!
//! A `ReadOnlyMap` is filled exactly once, from an iterator, and exposes
//! lookups and iteration only. There is no way to insert, remove or clear
//! entries after construction:
//!
//! ```compile_fail
//! use procsnap::model::ReadOnlyMap;
//!
//! let mut env: ReadOnlyMap<String, Option<String>> =
//!     [("HOME".to_string(), Some("/root".to_string()))].into_iter().collect();
//! env.insert("PATH".to_string(), None);
//! ```
//!
//! ```compile_fail
//! use procsnap::model::ReadOnlyMap;
//!
//! let mut fds: ReadOnlyMap<u32, String> = [(0, "/dev/null".to_string())].into_iter().collect();
//! fds.clear();
//! ```

use serde::Serialize;
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Immutable map with sorted keys.
///
/// Duplicate keys during construction keep the last value, mirroring how the
/// kernel-provided tables are interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReadOnlyMap<K: Ord, V> {
    inner: BTreeMap<K, V>,
}

impl<K: Ord, V> ReadOnlyMap<K, V> {
    /// Returns the value for `key`, if present.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.get(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, K, V> {
        self.inner.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, K, V> {
        self.inner.keys()
    }

    pub fn values(&self) -> btree_map::Values<'_, K, V> {
        self.inner.values()
    }
}

impl<K: Ord, V> Default for ReadOnlyMap<K, V> {
    fn default() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for ReadOnlyMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a ReadOnlyMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = btree_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
