//! [`ChainedHashTable`] is a hash table that resolves collisions by separate chaining.

mod bucket;

pub use bucket::Chain;

use std::collections::hash_map::RandomState;
use std::fmt::{self, Debug};
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;
use std::mem::replace;
use std::slice;

use log::{debug, warn};

use crate::hash_table::{
    allocate, grown_capacity, index_of, normalize_capacity, HashTable, LoadFactor,
};
use crate::{Equivalent, GrowError, InsertError, DEFAULT_CAPACITY};
use bucket::{Bucket, Node};

/// Hash table with separate chaining.
///
/// [`ChainedHashTable`] has an array of buckets where each bucket owns a singly linked chain of
/// entries. An entry whose key hashes to an occupied bucket is pushed at the front of the chain.
///
/// ## Growth
///
/// The bucket array doubles before an insertion of a new key would let the load factor reach
/// [`ChainedHashTable::MAX_LOAD_FACTOR`]. Growth relinks every node into the new bucket array
/// without reallocating nodes; the new array is allocated up-front, therefore a failed allocation
/// leaves the table unchanged.
///
/// ## The key statistics for [`ChainedHashTable`]
///
/// * The default number of buckets: 16.
/// * The expected length of a chain: below 0.75.
/// * The expected number of key comparisons for a lookup: O(1); worst case O(n).
pub struct ChainedHashTable<K, V, H = RandomState>
where
    H: BuildHasher,
{
    buckets: Vec<Bucket<K, V>>,
    len: usize,
    build_hasher: H,
}

/// An iterator over the entries of a [`ChainedHashTable`].
pub struct Iter<'h, K, V> {
    buckets: slice::Iter<'h, Bucket<K, V>>,
    chain: Option<Chain<'h, K, V>>,
    remaining: usize,
}

impl<K, V, H> ChainedHashTable<K, V, H>
where
    H: BuildHasher,
{
    /// The load factor that the table never reaches.
    pub const MAX_LOAD_FACTOR: LoadFactor = LoadFactor::new(3, 4);

    /// Creates an empty [`ChainedHashTable`] with the given [`BuildHasher`].
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let table: ChainedHashTable<u64, u32, RandomState> =
    ///     ChainedHashTable::with_hasher(RandomState::new());
    /// assert_eq!(table.capacity(), 16);
    /// ```
    #[inline]
    pub fn with_hasher(build_hasher: H) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, build_hasher)
    }

    /// Creates an empty [`ChainedHashTable`] with the specified number of buckets and
    /// [`BuildHasher`].
    ///
    /// A zero capacity is replaced with the default capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let table: ChainedHashTable<u64, u32, RandomState> =
    ///     ChainedHashTable::with_capacity_and_hasher(5, RandomState::new());
    /// assert_eq!(table.capacity(), 5);
    ///
    /// let table: ChainedHashTable<u64, u32, RandomState> =
    ///     ChainedHashTable::with_capacity_and_hasher(0, RandomState::new());
    /// assert_eq!(table.capacity(), 16);
    /// ```
    #[inline]
    pub fn with_capacity_and_hasher(capacity: usize, build_hasher: H) -> Self {
        let mut buckets = Vec::new();
        buckets.resize_with(normalize_capacity(capacity), Bucket::default);
        Self {
            buckets,
            len: 0,
            build_hasher,
        }
    }

    /// Returns the number of entries in the [`ChainedHashTable`].
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let mut table: ChainedHashTable<u64, u32> = ChainedHashTable::new();
    ///
    /// assert!(table.insert(1, 0).is_ok());
    /// assert_eq!(table.len(), 1);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the [`ChainedHashTable`] is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let mut table: ChainedHashTable<u64, u32> = ChainedHashTable::new();
    ///
    /// assert!(table.is_empty());
    /// assert!(table.insert(1, 0).is_ok());
    /// assert!(!table.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of buckets.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let mut table: ChainedHashTable<u64, u32> = ChainedHashTable::with_capacity(4);
    /// assert_eq!(table.capacity(), 4);
    ///
    /// for k in 0..3 {
    ///     assert!(table.insert(k, 0).is_ok());
    /// }
    /// assert_eq!(table.capacity(), 8);
    /// ```
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the current load factor.
    #[allow(clippy::cast_precision_loss)]
    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    /// Returns a reference to the specified [`BuildHasher`].
    #[inline]
    pub fn hasher(&self) -> &H {
        &self.build_hasher
    }

    /// Returns an iterator over the chain stored in the bucket at `index`.
    ///
    /// Returns `None` if `index` is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let mut table: ChainedHashTable<u64, u32> = ChainedHashTable::with_capacity(1);
    ///
    /// assert!(table.insert(1, 0).is_ok());
    /// let total: usize = (0..table.capacity())
    ///     .filter_map(|i| table.bucket(i))
    ///     .map(Iterator::count)
    ///     .sum();
    /// assert_eq!(total, 1);
    /// assert!(table.bucket(table.capacity()).is_none());
    /// ```
    #[inline]
    pub fn bucket(&self, index: usize) -> Option<Chain<'_, K, V>> {
        self.buckets.get(index).map(Bucket::iter)
    }

    /// Returns an iterator over all the entries in an unspecified order.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let mut table: ChainedHashTable<u64, u32> = ChainedHashTable::new();
    ///
    /// assert!(table.insert(1, 10).is_ok());
    /// assert!(table.insert(2, 20).is_ok());
    ///
    /// let mut sum = 0;
    /// for (k, v) in &table {
    ///     sum += k + u64::from(*v);
    /// }
    /// assert_eq!(sum, 33);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: None,
            remaining: self.len,
        }
    }

    /// Removes all the entries without changing the capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let mut table: ChainedHashTable<u64, u32> = ChainedHashTable::new();
    ///
    /// assert!(table.insert(1, 0).is_ok());
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 16);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(|b| *b = Bucket::default());
        self.len = 0;
    }
}

impl<K, V, H> ChainedHashTable<K, V, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    /// Inserts a key-value pair into the [`ChainedHashTable`].
    ///
    /// Returns the previous value if the key was present; the key itself is not replaced.
    ///
    /// # Errors
    ///
    /// Returns an error along with the supplied key-value pair if the table had to grow and the
    /// new bucket array could not be allocated. The table is left unchanged in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let mut table: ChainedHashTable<u64, u32> = ChainedHashTable::new();
    ///
    /// assert_eq!(table.insert(1, 0).ok(), Some(None));
    /// assert_eq!(table.insert(1, 1).ok(), Some(Some(0)));
    /// assert_eq!(table.search(&1), Some(&1));
    /// assert_eq!(table.len(), 1);
    /// ```
    #[inline]
    pub fn insert(&mut self, key: K, val: V) -> Result<Option<V>, InsertError<K, V>> {
        let hash = self.hash(&key);
        let mut index = index_of(hash, self.buckets.len());
        if let Some(v) = self.buckets[index].search_mut(&key) {
            return Ok(Some(replace(v, val)));
        }
        if self.needs_growth() {
            if let Err(cause) = self.resize_and_rehash() {
                warn!("failed to grow: {cause}");
                return Err(InsertError::new(key, val, cause));
            }
            index = index_of(hash, self.buckets.len());
        }
        self.buckets[index].push_front(Node::new(key, val));
        self.len += 1;
        Ok(None)
    }

    /// Searches for the value associated with the key.
    ///
    /// Returns `None` if the key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let mut table: ChainedHashTable<String, u32> = ChainedHashTable::new();
    ///
    /// assert!(table.insert("Alice".to_string(), 88).is_ok());
    /// assert_eq!(table.search("Alice"), Some(&88));
    /// assert!(table.search("Frank").is_none());
    /// ```
    #[inline]
    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        self.bucket_of(key).search(key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value associated with the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let mut table: ChainedHashTable<u64, u32> = ChainedHashTable::new();
    ///
    /// assert!(table.get_mut(&1).is_none());
    /// assert!(table.insert(1, 0).is_ok());
    /// if let Some(v) = table.get_mut(&1) {
    ///     *v = 2;
    /// }
    /// assert_eq!(table.search(&1), Some(&2));
    /// ```
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        let index = index_of(self.hash(key), self.buckets.len());
        self.buckets[index].search_mut(key)
    }

    /// Returns `true` if the [`ChainedHashTable`] contains the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let mut table: ChainedHashTable<u64, u32> = ChainedHashTable::new();
    ///
    /// assert!(!table.contains(&1));
    /// assert!(table.insert(1, 0).is_ok());
    /// assert!(table.contains(&1));
    /// ```
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        self.search(key).is_some()
    }

    /// Removes the entry associated with the key.
    ///
    /// Returns `false` if the key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let mut table: ChainedHashTable<u64, u32> = ChainedHashTable::new();
    ///
    /// assert!(!table.remove(&1));
    /// assert!(table.insert(1, 0).is_ok());
    /// assert!(table.remove(&1));
    /// assert!(table.is_empty());
    /// ```
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Removes the entry associated with the key and returns it.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let mut table: ChainedHashTable<u64, u32> = ChainedHashTable::new();
    ///
    /// assert!(table.insert(1, 0).is_ok());
    /// assert_eq!(table.take(&1), Some((1, 0)));
    /// assert!(table.take(&1).is_none());
    /// ```
    #[inline]
    pub fn take<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        let index = index_of(self.hash(key), self.buckets.len());
        let removed = self.buckets[index].remove(key)?;
        self.len -= 1;
        Some(removed)
    }

    /// Retains the entries specified by the predicate.
    ///
    /// Returns the number of removed entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let mut table: ChainedHashTable<u64, u32> = ChainedHashTable::new();
    ///
    /// for k in 0..8 {
    ///     assert!(table.insert(k, 0).is_ok());
    /// }
    /// assert_eq!(table.retain(|k, _| k % 2 == 0), 4);
    /// assert_eq!(table.len(), 4);
    /// ```
    #[inline]
    pub fn retain<F: FnMut(&K, &mut V) -> bool>(&mut self, mut pred: F) -> usize {
        let removed: usize = self
            .buckets
            .iter_mut()
            .map(|bucket| bucket.retain(&mut pred))
            .sum();
        self.len -= removed;
        removed
    }

    /// Returns the bucket the key belongs to.
    #[inline]
    fn bucket_of<Q>(&self, key: &Q) -> &Bucket<K, V>
    where
        Q: Hash + ?Sized,
    {
        &self.buckets[index_of(self.hash(key), self.buckets.len())]
    }

    /// Doubles the number of buckets and relinks every node.
    fn resize_and_rehash(&mut self) -> Result<(), GrowError> {
        let old_capacity = self.buckets.len();
        let new_capacity = grown_capacity(old_capacity)?;
        let mut new_buckets = allocate(new_capacity, Bucket::default)?;
        debug!("resizing from {old_capacity} to {new_capacity} buckets");
        for bucket in &mut self.buckets {
            while let Some(node) = bucket.pop_front() {
                let index = index_of(self.build_hasher.hash_one(&node.key), new_capacity);
                new_buckets[index].push_front(node);
            }
        }
        self.buckets = new_buckets;
        Ok(())
    }
}

impl<K, V> ChainedHashTable<K, V, RandomState> {
    /// Creates an empty default [`ChainedHashTable`].
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let table: ChainedHashTable<u64, u32> = ChainedHashTable::new();
    /// assert_eq!(table.capacity(), 16);
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty [`ChainedHashTable`] with the specified number of buckets.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let table: ChainedHashTable<u64, u32> = ChainedHashTable::with_capacity(1000);
    /// assert_eq!(table.capacity(), 1000);
    /// ```
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<K, V, H> Clone for ChainedHashTable<K, V, H>
where
    K: Clone,
    V: Clone,
    H: BuildHasher + Clone,
{
    /// Deep-copies every chain into a new bucket array of the same capacity.
    #[inline]
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            len: self.len,
            build_hasher: self.build_hasher.clone(),
        }
    }
}

impl<K, V, H> Debug for ChainedHashTable<K, V, H>
where
    K: Debug,
    V: Debug,
    H: BuildHasher,
{
    /// Prints the entries as a map, or every bucket chain in order with the alternate flag.
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_list().entries(self.buckets.iter()).finish()
        } else {
            f.debug_map().entries(self.iter()).finish()
        }
    }
}

impl<K, V, H> Default for ChainedHashTable<K, V, H>
where
    H: BuildHasher + Default,
{
    /// Creates an empty default [`ChainedHashTable`].
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let table: ChainedHashTable<u64, u32> = ChainedHashTable::default();
    /// assert_eq!(table.capacity(), 16);
    /// ```
    #[inline]
    fn default() -> Self {
        Self::with_hasher(H::default())
    }
}

impl<K, V, H> Extend<(K, V)> for ChainedHashTable<K, V, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    /// Upserts every key-value pair.
    ///
    /// # Panics
    ///
    /// Panics if the table fails to grow.
    #[inline]
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            if let Err(error) = self.insert(k, v) {
                panic!("memory allocation failure: {}", error.cause());
            }
        }
    }
}

impl<K, V, H> FromIterator<(K, V)> for ChainedHashTable<K, V, H>
where
    K: Eq + Hash,
    H: BuildHasher + Default,
{
    #[inline]
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = Self::default();
        table.extend(iter);
        table
    }
}

impl<K, V, H> HashTable<K, V, H> for ChainedHashTable<K, V, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    const MAX_LOAD: LoadFactor = Self::MAX_LOAD_FACTOR;

    #[inline]
    fn hasher(&self) -> &H {
        &self.build_hasher
    }
    #[inline]
    fn num_entries(&self) -> usize {
        self.len
    }
    #[inline]
    fn num_slots(&self) -> usize {
        self.buckets.len()
    }
}

impl<'h, K, V, H> IntoIterator for &'h ChainedHashTable<K, V, H>
where
    H: BuildHasher,
{
    type Item = (&'h K, &'h V);
    type IntoIter = Iter<'h, K, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, H> PartialEq for ChainedHashTable<K, V, H>
where
    K: Eq + Hash,
    V: PartialEq,
    H: BuildHasher,
{
    /// Compares two [`ChainedHashTable`] instances entry by entry.
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|(k, v)| other.search(k) == Some(v))
    }
}

impl<K, V, H> Eq for ChainedHashTable<K, V, H>
where
    K: Eq + Hash,
    V: Eq,
    H: BuildHasher,
{
}

impl<'h, K, V> Iterator for Iter<'h, K, V> {
    type Item = (&'h K, &'h V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some(entry);
            }
            self.chain = Some(self.buckets.next()?.iter());
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Debug for Iter<'_, K, V> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}
