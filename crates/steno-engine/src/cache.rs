// LRU-bounded cache of loaded resources keyed by path
//
// Loaded dictionaries, orthographies and systems are shared as `Arc`s. The
// cache holds one strong reference per entry and evicts the least recently
// used entry once `capacity` is exceeded; callers still holding an `Arc`
// keep their copy alive.

use std::sync::Arc;

use hashbrown::HashMap;

/// Default number of entries kept per resource kind.
pub const DEFAULT_CAPACITY: usize = 16;

/// Path-keyed cache with least-recently-used eviction.
pub struct ResourceCache<T: ?Sized> {
    capacity: usize,
    entries: HashMap<String, (Arc<T>, u64)>,
    clock: u64,
}

impl<T: ?Sized> ResourceCache<T> {
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            clock: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached value for `path`, marking it most recently used.
    pub fn get(&mut self, path: &str) -> Option<Arc<T>> {
        self.clock += 1;
        let clock = self.clock;
        self.entries.get_mut(path).map(|(value, used)| {
            *used = clock;
            Arc::clone(value)
        })
    }

    /// Whether `path` is cached, without touching its recency.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Store `value` under `path`, evicting the least recently used entry
    /// when the cache is full.
    pub fn insert(&mut self, path: &str, value: Arc<T>) {
        self.clock += 1;
        if !self.entries.contains_key(path) && self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (_, used))| *used)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                tracing::debug!(path = %oldest, "evicting cached resource");
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(path.to_string(), (value, self.clock));
    }

    /// Drop the entry for `path`; returns whether it was cached.
    pub fn invalidate(&mut self, path: &str) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: ?Sized> Default for ResourceCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let mut cache: ResourceCache<str> = ResourceCache::new(2);
        cache.insert("a", Arc::from("A"));
        cache.insert("b", Arc::from("B"));
        assert_eq!(cache.get("a").as_deref(), Some("A"));
        cache.insert("c", Arc::from("C"));
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn replacing_does_not_evict() {
        let mut cache: ResourceCache<u32> = ResourceCache::new(2);
        cache.insert("a", Arc::new(1));
        cache.insert("b", Arc::new(2));
        cache.insert("a", Arc::new(3));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").as_deref(), Some(&3));
        assert_eq!(cache.get("b").as_deref(), Some(&2));
    }

    #[test]
    fn evicted_values_stay_alive_for_holders() {
        let mut cache: ResourceCache<String> = ResourceCache::new(1);
        let held = Arc::new("kept".to_string());
        cache.insert("x", held.clone());
        cache.insert("y", Arc::new("other".to_string()));
        assert!(!cache.contains("x"));
        assert_eq!(held.as_str(), "kept");
    }

    #[test]
    fn invalidate_and_clear() {
        let mut cache: ResourceCache<u8> = ResourceCache::default();
        assert_eq!(cache.capacity(), DEFAULT_CAPACITY);
        cache.insert("a", Arc::new(1));
        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        cache.insert("b", Arc::new(2));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("b"), None);
    }
}
