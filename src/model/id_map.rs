/// Entities keyed by their user-facing ID, in insertion order.
///
/// Keys are user-facing IDs, values are store keys. Collections returned by
/// the aggregation queries use the same type.
#[derive(Debug, Clone, PartialEq)]
pub struct IdMap<K> {
    entries: Vec<(u32, K)>,
}

impl<K> Default for IdMap<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: Copy> IdMap<K> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `id` unless the key is already present.
    ///
    /// Returns `false` (and leaves the existing entry alone) on a duplicate.
    pub fn insert(&mut self, id: u32, value: K) -> bool {
        if self.contains_key(id) {
            return false;
        }
        self.entries.push((id, value));
        true
    }

    /// Inserts or replaces the entry for `id`, keeping its original position.
    pub fn upsert(&mut self, id: u32, value: K) {
        match self.entries.iter_mut().find(|(key, _)| *key == id) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((id, value)),
        }
    }

    /// Removes the entry for `id`, if any.
    pub fn remove(&mut self, id: u32) -> Option<K> {
        let pos = self.entries.iter().position(|(key, _)| *key == id)?;
        Some(self.entries.remove(pos).1)
    }

    /// Returns the value stored under `id`.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<K> {
        self.entries
            .iter()
            .find_map(|&(key, value)| (key == id).then_some(value))
    }

    /// Returns `true` if `id` is a key of the map.
    #[must_use]
    pub fn contains_key(&self, id: u32) -> bool {
        self.entries.iter().any(|(key, _)| *key == id)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// User-facing IDs in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|&(key, _)| key)
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.iter().map(|&(_, value)| value)
    }

    /// `(id, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, K)> + '_ {
        self.entries.iter().copied()
    }
}

