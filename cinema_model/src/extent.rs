/// Cinema Model — Extent Registry
///
/// One ordered registry per entity type. An id is present iff the entity
/// is live. Ids are allocated monotonically per extent and never reused
/// until the extent is cleared.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Typed identity
// ---------------------------------------------------------------------------

/// Identity of a live entity of type `T`.
///
/// Serialized as a bare integer. The marker keeps ids of different entity
/// types from being mixed up at compile time.
pub struct Id<T> {
    raw: u64,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub const fn from_raw(raw: u64) -> Self {
        Self {
            raw,
            _kind: PhantomData,
        }
    }

    pub const fn raw(self) -> u64 {
        self.raw
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.raw)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.raw)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.raw)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Self::from_raw)
    }
}

// ---------------------------------------------------------------------------
// Extent
// ---------------------------------------------------------------------------

/// Insertion-ordered set of live entities of one type.
///
/// Ids grow monotonically, so key order is insertion order.
pub struct Extent<T> {
    items: BTreeMap<Id<T>, T>,
    last_id: u64,
}

impl<T> Default for Extent<T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Extent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.items.iter()).finish()
    }
}

impl<T: Clone> Clone for Extent<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            last_id: self.last_id,
        }
    }
}

impl<T> Extent<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next id. The entity is not live until registered.
    pub(crate) fn allocate(&mut self) -> Id<T> {
        self.last_id += 1;
        Id::from_raw(self.last_id)
    }

    /// Add `item` under `id`. Returns `false` (and drops `item`) if the id
    /// is already registered.
    pub(crate) fn register(&mut self, id: Id<T>, item: T) -> bool {
        if self.items.contains_key(&id) {
            return false;
        }
        self.last_id = self.last_id.max(id.raw());
        self.items.insert(id, item);
        true
    }

    /// Remove `id` if present.
    pub(crate) fn unregister(&mut self, id: Id<T>) -> Option<T> {
        self.items.remove(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
        self.last_id = 0;
    }

    pub(crate) fn get_mut(&mut self, id: Id<T>) -> Option<&mut T> {
        self.items.get_mut(&id)
    }

    pub fn contains(&self, id: Id<T>) -> bool {
        self.items.contains_key(&id)
    }

    pub fn get(&self, id: Id<T>) -> Option<&T> {
        self.items.get(&id)
    }

    /// Read-only view in insertion order.
    pub fn all(&self) -> impl Iterator<Item = (Id<T>, &T)> + '_ {
        self.items.iter().map(|(id, item)| (*id, item))
    }

    pub fn ids(&self) -> Vec<Id<T>> {
        self.items.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
