//! A named hash table of strings with separate chaining.

use std::fmt;

use log::debug;

/// Number of buckets of a table created by [`HashTable::new`].
pub const DEFAULT_CAPACITY: usize = 10;

/// The table doubles its capacity before an insert once `size / capacity` reaches this ratio.
pub const MAX_LOAD_FACTOR: f64 = 0.7;

const HASH_SEED: i64 = 5381;

type Link = Option<Box<Entry>>;

/// A key-value pair in a collision chain.
#[derive(Debug)]
struct Entry {
    key: String,
    value: String,
    next: Link,
}

/// A string to string map with separate chaining.
///
/// ```
/// use dsdb::HashTable;
/// let mut table = HashTable::new("colors");
/// table.insert("sky", "blue");
/// table.insert("grass", "green");
/// assert_eq!(table.search("sky"), Some("blue"));
/// assert!(table.remove("sky"));
/// assert!(table.search("sky").is_none());
/// ```
#[derive(Debug)]
pub struct HashTable {
    name: String,
    buckets: Vec<Link>,
    size: usize,
}

/// An iterator over the key-value pairs of a table, bucket by bucket.
pub struct Iter<'a> {
    buckets: std::slice::Iter<'a, Link>,
    chain: Option<&'a Entry>,
}

impl HashTable {
    /// Creates an empty table with [`DEFAULT_CAPACITY`] buckets.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, DEFAULT_CAPACITY)
    }

    /// Creates an empty table with `capacity` buckets (at least one).
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            buckets: empty_buckets(capacity.max(1)),
            size: 0,
        }
    }

    /// Returns the name the table is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of key-value pairs.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Same as [`HashTable::size`].
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the table holds no key-value pairs.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the current number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Drops all entries. The capacity is kept.
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            // Unlink one entry at a time to keep drop depth constant
            let mut current = bucket.take();
            while let Some(mut entry) = current {
                current = entry.next.take();
            }
        }
        self.size = 0;
    }

    /// Inserts a key-value pair.
    /// If the key is already present, its value is replaced in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());

        if self.size >= self.resize_threshold() {
            self.resize(self.capacity() * 2);
        }

        let index = self.bucket_index(&key);
        let mut current = self.buckets[index].as_deref_mut();
        while let Some(entry) = current {
            if entry.key == key {
                entry.value = value;
                return;
            }
            current = entry.next.as_deref_mut();
        }

        let next = self.buckets[index].take();
        self.buckets[index] = Some(Box::new(Entry { key, value, next }));
        self.size += 1;
    }

    /// Returns the value stored under `key`.
    pub fn search(&self, key: &str) -> Option<&str> {
        let mut current = self.buckets[self.bucket_index(key)].as_deref();
        while let Some(entry) = current {
            if entry.key == key {
                return Some(&entry.value);
            }
            current = entry.next.as_deref();
        }
        None
    }

    /// Returns true if the table contains `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.search(key).is_some()
    }

    /// Removes a key from the table.
    /// Returns whether the key was previously in the table.
    pub fn remove(&mut self, key: &str) -> bool {
        let index = self.bucket_index(key);

        // Find link to-be-unlinked
        let mut link = &mut self.buckets[index];
        while link.as_ref().map_or(false, |entry| entry.key != key) {
            link = &mut link.as_mut().unwrap().next;
        }

        match link.take() {
            None => false,
            Some(mut entry) => {
                *link = entry.next.take();
                self.size -= 1;
                true
            }
        }
    }

    /// Returns an iterator over all key-value pairs, bucket by bucket and
    /// newest first within a bucket. The order changes when the table resizes.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            buckets: self.buckets.iter(),
            chain: None,
        }
    }

    /// Panics if the size counter is off, an entry sits in the wrong bucket,
    /// a key occurs twice or the load factor is exceeded.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        let mut keys = std::collections::HashSet::new();
        for (index, bucket) in self.buckets.iter().enumerate() {
            let mut current = bucket.as_deref();
            while let Some(entry) = current {
                assert_eq!(bucket_index(&entry.key, self.capacity()), index);
                assert!(keys.insert(entry.key.as_str()));
                current = entry.next.as_deref();
            }
        }
        assert_eq!(keys.len(), self.size);
        assert!(self.size as f64 <= MAX_LOAD_FACTOR * self.capacity() as f64);
    }

    fn resize_threshold(&self) -> usize {
        (self.capacity() as f64 * MAX_LOAD_FACTOR) as usize
    }

    fn bucket_index(&self, key: &str) -> usize {
        bucket_index(key, self.capacity())
    }

    /// Moves every entry into a new bucket array of `new_capacity` buckets.
    /// Entries are relinked, never copied.
    fn resize(&mut self, new_capacity: usize) {
        debug!(
            "resizing hash table '{}' from {} to {} buckets ({} entries)",
            self.name,
            self.capacity(),
            new_capacity,
            self.size
        );

        let mut buckets = empty_buckets(new_capacity);
        for bucket in self.buckets.iter_mut() {
            let mut current = bucket.take();
            while let Some(mut entry) = current {
                current = entry.next.take();
                let index = bucket_index(&entry.key, new_capacity);
                entry.next = buckets[index].take();
                buckets[index] = Some(entry);
            }
        }
        self.buckets = buckets;
    }
}

impl Drop for HashTable {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Display for HashTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash table '{}':", self.name)?;
        for (index, bucket) in self.buckets.iter().enumerate() {
            write!(f, "\n  [{}]: ", index)?;
            let mut current = bucket.as_deref();
            if current.is_none() {
                write!(f, "NULL")?;
            }
            while let Some(entry) = current {
                write!(f, "{{{}: {}}}", entry.key, entry.value)?;
                current = entry.next.as_deref();
                if current.is_some() {
                    write!(f, " -> ")?;
                }
            }
        }
        Ok(())
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain {
                self.chain = entry.next.as_deref();
                return Some((&entry.key, &entry.value));
            }
            self.chain = self.buckets.next()?.as_deref();
        }
    }
}

impl<'a> IntoIterator for &'a HashTable {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn empty_buckets(capacity: usize) -> Vec<Link> {
    let mut buckets = Vec::with_capacity(capacity);
    buckets.resize_with(capacity, || None);
    buckets
}

/// djb2 over the characters of `key` with wrapping signed 64 bit arithmetic,
/// reduced modulo `capacity`. A negative remainder is negated, which cannot
/// overflow since its magnitude is below `capacity`.
fn bucket_index(key: &str, capacity: usize) -> usize {
    let hash = key.chars().fold(HASH_SEED, |hash, c| {
        hash.wrapping_mul(33).wrapping_add(c as i64)
    });
    let index = (hash % capacity as i64).unsigned_abs() as usize;
    debug_assert!(index < capacity);
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new() {
        let table = HashTable::new("empty");
        assert_eq!(table.name(), "empty");
        assert_eq!(table.capacity(), DEFAULT_CAPACITY);
        assert_eq!(table.size(), 0);
        assert!(table.is_empty());
        assert!(table.search("missing").is_none());
        table.check_consistency();
    }

    #[test]
    fn with_capacity() {
        assert_eq!(HashTable::with_capacity("t", 3).capacity(), 3);
        assert_eq!(HashTable::with_capacity("t", 0).capacity(), 1);
    }

    #[test]
    fn hash() {
        assert_eq!(bucket_index("", 10), 1);
        // 5381 * 33 + 'a' = 177670
        assert_eq!(bucket_index("a", 10), 0);
        assert_eq!(bucket_index("a", 20), 10);
        assert_eq!(bucket_index("a", 1_000_000), 177_670);
    }

    #[test]
    fn hash_of_long_key_wraps_into_range() {
        let key = "z".repeat(1_000);
        for capacity in [1, 7, 10, 20, 40, 1_000_003] {
            assert!(bucket_index(&key, capacity) < capacity);
        }
    }

    #[test]
    fn insert_update() {
        let mut table = HashTable::new("t");
        table.insert("k", "v1");
        table.insert("k", "v2");
        assert_eq!(table.size(), 1);
        assert_eq!(table.search("k"), Some("v2"));
        table.check_consistency();
    }

    #[test]
    fn collision_chain() {
        let mut table = HashTable::new("t");
        assert_eq!(table.bucket_index("a"), table.bucket_index("k"));

        table.insert("a", "1");
        table.insert("k", "2");
        table.check_consistency();

        // Newest entry heads the chain
        assert_eq!(
            table.iter().collect::<Vec<_>>(),
            vec![("k", "2"), ("a", "1")]
        );

        assert!(table.remove("a"));
        assert_eq!(table.search("k"), Some("2"));
        assert!(table.search("a").is_none());
        assert!(!table.remove("a"));
        assert_eq!(table.size(), 1);
        table.check_consistency();
    }

    #[test]
    fn remove_from_chain_head_and_middle() {
        let mut table = HashTable::new("t");
        // 'a', 'k' and 'u' share bucket 0 of 10
        for key in ["a", "k", "u"] {
            table.insert(key, key);
        }
        assert!(table.remove("k"));
        assert!(table.remove("u"));
        assert_eq!(table.search("a"), Some("a"));
        assert_eq!(table.size(), 1);
        table.check_consistency();
    }

    #[test]
    fn remove_chain_tail() {
        let mut table = HashTable::new("t");
        // 'a', 'k' and 'u' share bucket 0 of 10, 'a' ends up last in the chain
        for key in ["a", "k", "u"] {
            table.insert(key, key);
        }
        assert!(table.remove("a"));
        assert!(!table.remove("a"));
        assert!(!table.remove("e"));
        assert_eq!(
            table.iter().collect::<Vec<_>>(),
            vec![("u", "u"), ("k", "k")]
        );
        assert_eq!(table.size(), 2);
        table.check_consistency();

        assert!(table.remove("u"));
        assert!(table.remove("k"));
        assert!(table.is_empty());
        table.check_consistency();
    }

    #[test]
    fn resize() {
        let mut table = HashTable::new("t");
        for i in 0..7 {
            table.insert(format!("key{}", i), "v");
        }
        assert_eq!(table.capacity(), 10);

        // Reaching the threshold grows the table before the next insert
        table.insert("key7", "v");
        assert_eq!(table.capacity(), 20);
        assert_eq!(table.size(), 8);
        table.check_consistency();
    }

    #[test]
    fn clear() {
        let mut table = HashTable::new("t");
        for i in 0..20 {
            table.insert(i.to_string(), i.to_string());
        }
        let capacity = table.capacity();
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.size(), 0);
        assert_eq!(table.capacity(), capacity);
        assert!(table.search("3").is_none());
        assert!(!table.remove("3"));
        table.check_consistency();
    }

    #[test]
    fn display() {
        let mut table = HashTable::with_capacity("t", 2);
        table.insert("a", "1");
        assert_eq!(table.to_string(), "Hash table 't':\n  [0]: {a: 1}\n  [1]: NULL");

        let mut table = HashTable::new("t");
        table.insert("a", "1");
        table.insert("k", "2");
        assert!(table.to_string().contains("[0]: {k: 2} -> {a: 1}"));
    }
}
