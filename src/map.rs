use crate::Redbud;

struct MapEntry<K: Ord, V> {
    key: K,
    value: Option<V>,
}

impl<K: Default + Ord, V> Default for MapEntry<K, V> {
    fn default() -> Self {
        Self {
            key: K::default(),
            value: Option::default(),
        }
    }
}

impl<K: Ord, V> PartialEq for MapEntry<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Ord, V> Eq for MapEntry<K, V> {}

impl<K: Ord, V> PartialOrd for MapEntry<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.key.cmp(&other.key))
    }
}

impl<K: Ord, V> Ord for MapEntry<K, V> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

/// An associative array, storing key-value pairs.
///
/// Uses a Redbud red-black tree with a specialized entry type ordered by
/// key only, so each key maps to a single value.
pub struct RedbudMap<K: Ord, V> {
    tree: Redbud<MapEntry<K, V>>,
}

impl<K: Default + Ord, V> RedbudMap<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: Redbud::new(),
        }
    }

    pub fn contains_key(&self, key: K) -> bool {
        self.tree.contains(&MapEntry { key, value: None })
    }

    /// Inserts a key-value pair, returning `true` when the key was new.
    ///
    /// An existing entry keeps its node; only its value is replaced.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let mut entry = MapEntry {
            key,
            value: Some(value),
        };

        if let Some(existing) = self.tree.find_key_mut(&entry) {
            existing.value = entry.value.take();
            return false;
        }

        self.tree.insert(entry);

        true
    }

    pub fn get(&self, key: K) -> Option<&V> {
        let dummy_entry = MapEntry { key, value: None };

        self.tree.find_key(&dummy_entry)?.value.as_ref()
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let dummy_entry = MapEntry { key, value: None };

        self.tree.find_key_mut(&dummy_entry)?.value.as_mut()
    }

    /// Removes the entry for `key`, returning whether one existed.
    pub fn remove(&mut self, key: K) -> bool {
        self.tree.remove(&MapEntry { key, value: None })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.len() == 0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }
}

impl<K: Default + Ord, V> Default for RedbudMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::RedbudMap;

    #[test]
    pub fn map_entry_multi_insertion() {
        let mut map = RedbudMap::<usize, usize>::new();

        assert!(map.insert(3, 17));
        assert!(map.insert(2, 12));
        assert!(map.insert(1, 7));

        assert!(map.contains_key(2));
        assert!(map.contains_key(1));
        assert!(map.contains_key(3));

        assert!(!map.insert(3, 19));
        assert_eq!(map.len(), 3);
        assert_eq!(*map.get(3).unwrap(), 19);
    }

    #[test]
    pub fn map_update_entry() {
        let mut map = RedbudMap::<usize, usize>::new();

        map.insert(3, 17);
        *map.get_mut(3).unwrap() = 5;

        assert_eq!(*map.get(3).unwrap(), 5);
    }

    #[test]
    pub fn map_removal() {
        let mut map = RedbudMap::<usize, usize>::new();

        map.insert(1, 10);
        map.insert(2, 20);

        assert!(map.remove(1));
        assert!(!map.remove(1));
        assert!(map.get(1).is_none());
        assert_eq!(*map.get(2).unwrap(), 20);
        assert_eq!(map.len(), 1);
    }

    #[test]
    pub fn map_missing_key() {
        let map = RedbudMap::<usize, usize>::new();

        assert!(!map.contains_key(4));
        assert!(map.get(4).is_none());
        assert!(map.is_empty());
    }
}
