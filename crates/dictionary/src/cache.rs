use {
    lru::LruCache,
    parking_lot::Mutex,
    std::{hash::Hash, num::NonZeroUsize},
};

/// A size-bounded LRU map. A capacity of zero disables the cache: nothing
/// is stored and every lookup misses.
pub(crate) struct BoundedCache<K, V> {
    inner: Option<Mutex<LruCache<K, V>>>,
}

impl<K: Hash + Eq, V: Clone> BoundedCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.as_ref()?.lock().get(key).cloned()
    }

    /// Stores `value`, returning the entry evicted to make room for it.
    pub fn put(&self, key: K, value: V) -> Option<(K, V)> {
        let inner = self.inner.as_ref()?;
        let mut cache = inner.lock();
        if cache.contains(&key) {
            cache.put(key, value);
            return None;
        }
        cache.push(key, value)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.as_ref()?.lock().pop(key)
    }

    /// Keeps the entries `keep` accepts and returns the others.
    pub fn retain(&self, mut keep: impl FnMut(&K, &V) -> bool) -> Vec<V> {
        let Some(inner) = &self.inner else {
            return vec![];
        };

        let mut cache = inner.lock();
        let mut kept = vec![];
        let mut removed = vec![];
        while let Some((k, v)) = cache.pop_lru() {
            if keep(&k, &v) {
                kept.push((k, v));
            } else {
                removed.push(v);
            }
        }
        // oldest first so the original recency order is restored
        for (k, v) in kept {
            cache.push(k, v);
        }
        removed
    }

    /// Empties the cache, handing back what it held.
    pub fn drain(&self) -> Vec<V> {
        let Some(inner) = &self.inner else {
            return vec![];
        };

        let mut cache = inner.lock();
        let mut values = Vec::with_capacity(cache.len());
        while let Some((_, v)) = cache.pop_lru() {
            values.push(v);
        }
        values
    }

    pub fn len(&self) -> usize {
        self.inner.as_ref().map(|c| c.lock().len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_cache_never_stores() {
        let cache = BoundedCache::new(0);
        assert!(!cache.is_enabled());
        assert_eq!(cache.put(1, "a"), None);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = BoundedCache::new(2);
        cache.put(1, "a");
        cache.put(2, "b");
        assert_eq!(cache.get(&1), Some("a"));

        assert_eq!(cache.put(3, "c"), Some((2, "b")));
        assert_eq!(cache.get(&2), None);

        // replacing a key evicts nothing
        assert_eq!(cache.put(3, "d"), None);
        assert_eq!(cache.get(&3), Some("d"));
    }

    #[test]
    fn retain_and_drain() {
        let cache = BoundedCache::new(4);
        for i in 0..4 {
            cache.put(i, i * 10);
        }

        assert_eq!(cache.retain(|k, _| k % 2 == 0), vec![10, 30]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&2), Some(20));

        let mut drained = cache.drain();
        drained.sort();
        assert_eq!(drained, vec![0, 20]);
        assert_eq!(cache.len(), 0);
    }
}
