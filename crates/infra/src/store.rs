//! Key/value document store abstraction.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

/// Keyed document store.
///
/// Repositories wrap this with typed queries; swapping the in-memory
/// implementation for a real database only touches this seam.
pub trait Store<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;
    fn upsert(&self, key: K, value: V);
    fn remove(&self, key: &K) -> Option<V>;
    fn list(&self) -> Vec<V>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V, S> Store<K, V> for Arc<S>
where
    S: Store<K, V> + ?Sized,
{
    fn get(&self, key: &K) -> Option<V> {
        (**self).get(key)
    }

    fn upsert(&self, key: K, value: V) {
        (**self).upsert(key, value)
    }

    fn remove(&self, key: &K) -> Option<V> {
        (**self).remove(key)
    }

    fn list(&self) -> Vec<V> {
        (**self).list()
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

/// In-memory store backed by `RwLock<HashMap>`.
#[derive(Debug)]
pub struct InMemoryStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> InMemoryStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, V> InMemoryStore<K, V> {
    /// Run a closure under the read lock.
    pub fn with_read<R>(&self, f: impl FnOnce(&HashMap<K, V>) -> R) -> R {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        f(&map)
    }

    /// Run a closure under the write lock.
    ///
    /// This is the atomicity primitive for compound operations: a
    /// check-then-mutate (quota consume, lockout counter, unique-email
    /// insert) runs as one critical section so concurrent requests cannot
    /// interleave between the check and the write.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut HashMap<K, V>) -> R) -> R {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        f(&mut map)
    }
}

impl<K, V> Default for InMemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Store<K, V> for InMemoryStore<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        self.with_read(|map| map.get(key).cloned())
    }

    fn upsert(&self, key: K, value: V) {
        self.with_write(|map| {
            map.insert(key, value);
        })
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.with_write(|map| map.remove(key))
    }

    fn list(&self) -> Vec<V> {
        self.with_read(|map| map.values().cloned().collect())
    }

    fn len(&self) -> usize {
        self.with_read(|map| map.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_crud() {
        let store: InMemoryStore<u32, String> = InMemoryStore::new();
        assert!(store.is_empty());

        store.upsert(1, "a".into());
        store.upsert(2, "b".into());
        assert_eq!(store.get(&1), Some("a".into()));
        assert_eq!(store.len(), 2);

        store.upsert(1, "a2".into());
        assert_eq!(store.get(&1), Some("a2".into()));
        assert_eq!(store.len(), 2);

        assert_eq!(store.remove(&1), Some("a2".into()));
        assert_eq!(store.get(&1), None);
    }

    #[test]
    fn with_write_is_a_single_critical_section() {
        use std::sync::Arc;
        use std::thread;

        let store: Arc<InMemoryStore<&'static str, u32>> = Arc::new(InMemoryStore::new());
        store.upsert("counter", 0);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..100 {
                        store.with_write(|map| {
                            let v = map.get("counter").copied().unwrap_or(0);
                            map.insert("counter", v + 1);
                        });
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.get(&"counter"), Some(800));
    }
}
