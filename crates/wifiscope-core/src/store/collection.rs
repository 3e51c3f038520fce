// ── Immutable entity collection ──
//
// Persistent, insertion-ordered storage for one entity kind. Collections
// are never mutated in place: a snapshot builds a new one, and cloning a
// state clones two `Arc`s.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::model::MacAddress;

/// An immutable, cheaply cloneable collection keyed by MAC address.
///
/// Iteration follows the order entities appeared in the snapshot that
/// built the collection. Equality ignores order.
#[derive(Debug)]
pub struct EntityCollection<T> {
    by_key: Arc<IndexMap<MacAddress, Arc<T>>>,
}

impl<T> Clone for EntityCollection<T> {
    fn clone(&self) -> Self {
        Self {
            by_key: Arc::clone(&self.by_key),
        }
    }
}

impl<T> Default for EntityCollection<T> {
    fn default() -> Self {
        Self {
            by_key: Arc::new(IndexMap::new()),
        }
    }
}

impl<T: PartialEq> PartialEq for EntityCollection<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.by_key, &other.by_key) || self.by_key == other.by_key
    }
}

impl<T> EntityCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from keyed entities. A repeated key keeps its
    /// first position and its last value.
    pub fn from_entries(entries: impl IntoIterator<Item = (MacAddress, T)>) -> Self {
        let by_key = entries
            .into_iter()
            .map(|(key, entity)| (key, Arc::new(entity)))
            .collect();
        Self {
            by_key: Arc::new(by_key),
        }
    }

    /// Look up an entity by key (cheap `Arc` clone).
    pub fn get(&self, key: &MacAddress) -> Option<Arc<T>> {
        self.by_key.get(key).map(Arc::clone)
    }

    pub fn contains_key(&self, key: &MacAddress) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &MacAddress> {
        self.by_key.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.by_key.values()
    }

    /// All entities as a vector of shared handles.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.by_key.values().map(Arc::clone).collect()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mac(n: u8) -> MacAddress {
        MacAddress::new(format!("aa:bb:cc:dd:ee:{n:02x}"))
    }

    #[test]
    fn from_entries_and_lookup() {
        let col = EntityCollection::from_entries([(mac(1), "first"), (mac(2), "second")]);

        assert_eq!(col.len(), 2);
        assert_eq!(*col.get(&mac(1)).unwrap(), "first");
        assert!(col.contains_key(&mac(2)));
        assert!(col.get(&mac(3)).is_none());
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let col = EntityCollection::from_entries([(mac(9), 9), (mac(1), 1), (mac(5), 5)]);
        let keys: Vec<_> = col.keys().map(MacAddress::as_str).collect();
        assert_eq!(keys, ["aa:bb:cc:dd:ee:09", "aa:bb:cc:dd:ee:01", "aa:bb:cc:dd:ee:05"]);
    }

    #[test]
    fn duplicate_key_keeps_last_value() {
        let col = EntityCollection::from_entries([(mac(1), 1), (mac(1), 2)]);
        assert_eq!(col.len(), 1);
        assert_eq!(*col.get(&mac(1)).unwrap(), 2);
    }

    #[test]
    fn clones_share_storage_and_compare_equal() {
        let a = EntityCollection::from_entries([(mac(1), 1)]);
        let b = a.clone();
        let c = EntityCollection::from_entries([(mac(1), 1)]);
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_ne!(a, EntityCollection::new());
    }
}
