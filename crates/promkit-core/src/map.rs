//! Chained hash map with an insertion-ordered key index.
//!
//! Buckets are [`OrderedList`] chains; a second list records keys in
//! insertion order so iteration never depends on bucket layout. Keys are
//! stored once as `Arc<str>` and shared between a bucket entry and the key
//! index. Every operation holds the table's mutex for its whole duration.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{poisoned, Result};
use crate::list::OrderedList;

const INITIAL_BUCKETS: usize = 32;

#[derive(Debug)]
struct Entry<V> {
    key: Arc<str>,
    value: V,
}

fn same_key<V>(a: &Entry<V>, b: &Entry<V>) -> bool {
    a.key == b.key
}

fn same_alloc(a: &Arc<str>, b: &Arc<str>) -> bool {
    Arc::ptr_eq(a, b)
}

/// Bucket index for `key` in a table of `buckets` chains.
///
/// Horner-style hash whose coefficient is regenerated on every character
/// instead of being a fixed prime, which spreads collisions towards
/// `1 / buckets` regardless of key shape.
pub fn bucket_index(key: &str, buckets: usize) -> usize {
    let m = buckets.max(2) as u64;
    let mut a: u64 = 31415;
    let b: u64 = 27183;
    let mut index: u64 = 0;
    for byte in key.bytes() {
        index = a.wrapping_mul(index).wrapping_add(u64::from(byte)) % m;
        a = a.wrapping_mul(b) % (m - 1);
    }
    index as usize
}

#[derive(Debug)]
struct Table<V> {
    buckets: Vec<OrderedList<Entry<V>>>,
    keys: OrderedList<Arc<str>>,
    size: usize,
}

impl<V> Table<V> {
    fn with_buckets(n: usize) -> Self {
        Self {
            buckets: (0..n).map(|_| OrderedList::with_comparator(same_key)).collect(),
            keys: OrderedList::with_comparator(same_alloc),
            size: 0,
        }
    }

    fn find(&self, key: &str) -> Option<&Entry<V>> {
        let chain = self.buckets.get(bucket_index(key, self.buckets.len()))?;
        chain.find(|e| &*e.key == key)
    }

    /// Insert or overwrite. Overwriting keeps the key's position in the index.
    fn insert(&mut self, key: Arc<str>, value: V) -> Option<V> {
        let n = self.buckets.len();
        let chain = &mut self.buckets[bucket_index(&key, n) % n];
        if let Some(entry) = chain.find_mut(|e| e.key == key) {
            return Some(std::mem::replace(&mut entry.value, value));
        }
        chain.append(Entry {
            key: Arc::clone(&key),
            value,
        });
        self.keys.append(key);
        self.size += 1;
        None
    }

    fn remove(&mut self, key: &str) -> Option<V> {
        let idx = bucket_index(key, self.buckets.len()) % self.buckets.len();
        let entry = self.buckets[idx].remove_where(|e| &*e.key == key)?;
        self.keys.remove(&entry.key);
        self.size -= 1;
        Some(entry.value)
    }

    /// Double the bucket array once occupancy passes one half.
    fn ensure_space(&mut self) {
        if self.size <= self.buckets.len() >> 1 {
            return;
        }
        let grown = Table::with_buckets(self.buckets.len() << 1);
        let Table { mut buckets, keys, .. } = std::mem::replace(self, grown);
        let old_len = buckets.len();
        // Walk the key index, not the buckets, so the new index keeps
        // insertion order.
        for key in keys.iter() {
            let idx = bucket_index(key, old_len) % old_len;
            if let Some(entry) = buckets[idx].remove_where(|e| Arc::ptr_eq(&e.key, key)) {
                self.insert(entry.key, entry.value);
            }
        }
    }
}

/// String-keyed map with deterministic (insertion-order) iteration.
#[derive(Debug)]
pub struct Map<V> {
    inner: Mutex<Table<V>>,
}

impl<V> Default for Map<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Map<V> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Table::with_buckets(INITIAL_BUCKETS)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Table<V>>> {
        self.inner.lock().map_err(|_| poisoned("map"))
    }

    /// Insert `value` under `key`, dropping any previous value in place.
    pub fn set(&self, key: &str, value: V) -> Result<()> {
        let mut table = self.lock()?;
        table.ensure_space();
        table.insert(Arc::from(key), value);
        Ok(())
    }

    /// Insert only when `key` is absent. Returns whether it was inserted.
    pub fn insert_new(&self, key: &str, value: V) -> Result<bool> {
        let mut table = self.lock()?;
        if table.find(key).is_some() {
            return Ok(false);
        }
        table.ensure_space();
        table.insert(Arc::from(key), value);
        Ok(true)
    }

    pub fn delete(&self, key: &str) -> Result<Option<V>> {
        Ok(self.lock()?.remove(key))
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.lock()?.find(key).is_some())
    }

    pub fn size(&self) -> Result<usize> {
        Ok(self.lock()?.size)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.size()? == 0)
    }

    /// Current bucket array length.
    pub fn bucket_count(&self) -> Result<usize> {
        Ok(self.lock()?.buckets.len())
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Result<Vec<Arc<str>>> {
        Ok(self.lock()?.keys.iter().cloned().collect())
    }
}

impl<V: Clone> Map<V> {
    pub fn get(&self, key: &str) -> Result<Option<V>> {
        Ok(self.lock()?.find(key).map(|e| e.value.clone()))
    }

    /// Snapshot of all values in insertion order.
    pub fn values(&self) -> Result<Vec<V>> {
        let table = self.lock()?;
        Ok(table
            .keys
            .iter()
            .filter_map(|k| table.find(k).map(|e| e.value.clone()))
            .collect())
    }

    /// Snapshot of `(key, value)` pairs in insertion order.
    pub fn entries(&self) -> Result<Vec<(Arc<str>, V)>> {
        let table = self.lock()?;
        Ok(table
            .keys
            .iter()
            .filter_map(|k| table.find(k).map(|e| (Arc::clone(k), e.value.clone())))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn index_is_in_range() {
        for n in [2usize, 32, 64, 1024] {
            for key in ["", "a", "http_requests_total{code=\"200\"}", "zzzzzzzzzzzz"] {
                assert!(bucket_index(key, n) < n);
            }
        }
    }

    #[test]
    fn overwrite_keeps_position() {
        let m = Map::new();
        m.set("a", 1).unwrap();
        m.set("b", 2).unwrap();
        m.set("a", 3).unwrap();
        assert_eq!(m.size().unwrap(), 2);
        assert_eq!(m.get("a").unwrap(), Some(3));
        let keys: Vec<String> = m.keys().unwrap().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn insert_new_refuses_existing() {
        let m = Map::new();
        assert!(m.insert_new("x", 1).unwrap());
        assert!(!m.insert_new("x", 2).unwrap());
        assert_eq!(m.get("x").unwrap(), Some(1));
    }
}
