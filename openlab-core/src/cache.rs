use std::{collections::HashMap, collections::VecDeque, fmt::Debug, hash::Hash};

/// Decides which key, if any, leaves the cache.
pub trait EvictionPolicy<K>: Send + Debug {
    /// A cached key was read.
    fn on_hit(&mut self, key: &K);

    /// A new key was stored. Returns the key to evict, if any.
    fn on_insert(&mut self, key: &K) -> Option<K>;
}

/// Keeps everything for the lifetime of the cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unbounded;

impl<K> EvictionPolicy<K> for Unbounded {
    fn on_hit(&mut self, _key: &K) {}

    fn on_insert(&mut self, _key: &K) -> Option<K> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct LeastRecentlyUsed<K> {
    capacity: usize,
    // Front is the least recently used key.
    order: VecDeque<K>,
}

impl<K> LeastRecentlyUsed<K> {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), order: VecDeque::new() }
    }
}

impl<K: Clone + PartialEq + Send + Debug> EvictionPolicy<K> for LeastRecentlyUsed<K> {
    fn on_hit(&mut self, key: &K) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn on_insert(&mut self, key: &K) -> Option<K> {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
        self.order.push_back(key.clone());

        if self.order.len() > self.capacity { self.order.pop_front() } else { None }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
pub struct MemoCache<K, V> {
    entries: HashMap<K, V>,
    policy: Box<dyn EvictionPolicy<K>>,
    stats: CacheStats,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn with_policy(policy: Box<dyn EvictionPolicy<K>>) -> Self {
        Self { entries: HashMap::new(), policy, stats: CacheStats::default() }
    }

    pub fn unbounded() -> Self {
        Self::with_policy(Box::new(Unbounded))
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.entries.contains_key(key) {
            self.stats.hits += 1;
            self.policy.on_hit(key);
            self.entries.get(key)
        } else {
            self.stats.misses += 1;
            None
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        if let Some(evicted) = self.policy.on_insert(&key) {
            self.entries.remove(&evicted);
        }
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
