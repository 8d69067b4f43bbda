//! [`ProbingHashTable`] is an open-addressing hash table with linear probing.

mod probe;
mod slot;

pub use slot::SlotState;

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
use probe::LinearProbe;
use slot::Slot;

/// Hash table with open addressing and linear probing.
///
/// [`ProbingHashTable`] stores entries in a flat array of slots. A key is placed in the first
/// vacant slot found by walking forward from its home slot. Removing an entry leaves a tombstone
/// behind so that keys placed further along the same probe sequence remain reachable; an
/// insertion reuses the first tombstone on its probe sequence.
///
/// ## Growth
///
/// The slot array doubles before an insertion of a new key would let the load factor reach
/// [`ProbingHashTable::MAX_LOAD_FACTOR`]. Tombstones are discarded whenever the slot array is
/// rebuilt; if tombstones would push the used slots to the threshold, the slot array is rebuilt
/// at the same capacity when live entries occupy at most half of the threshold, and doubled
/// otherwise. Each rebuild thus frees a share of the slots proportional to the capacity, and at
/// least one empty slot always exists, which bounds every probe sequence.
///
/// ## The key statistics for [`ProbingHashTable`]
///
/// * The default number of slots: 16.
/// * The maximum ratio of live entries and tombstones to slots: below 0.7.
/// * The expected number of probes for a lookup: O(1); worst case O(n).
pub struct ProbingHashTable<K, V, H = RandomState>
where
    H: BuildHasher,
{
    slots: Vec<Slot<K, V>>,
    len: usize,
    tombstones: usize,
    build_hasher: H,
}

/// An iterator over the entries of a [`ProbingHashTable`].
pub struct Iter<'h, K, V> {
    slots: slice::Iter<'h, Slot<K, V>>,
    remaining: usize,
}

/// The outcome of resolving the slot for a key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Probe {
    /// The slot holds the key.
    Found(usize),
    /// The key is absent and may be placed at the slot.
    Vacant(usize),
}

impl<K, V, H> ProbingHashTable<K, V, H>
where
    H: BuildHasher,
{
    /// The load factor that the table never reaches.
    pub const MAX_LOAD_FACTOR: LoadFactor = LoadFactor::new(7, 10);

    /// Creates an empty [`ProbingHashTable`] with the given [`BuildHasher`].
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ProbingHashTable;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let table: ProbingHashTable<u64, u32, RandomState> =
    ///     ProbingHashTable::with_hasher(RandomState::new());
    /// assert_eq!(table.capacity(), 16);
    /// ```
    #[inline]
    pub fn with_hasher(build_hasher: H) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, build_hasher)
    }

    /// Creates an empty [`ProbingHashTable`] with the specified number of slots and
    /// [`BuildHasher`].
    ///
    /// A zero capacity is replaced with the default capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ProbingHashTable;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let table: ProbingHashTable<u64, u32, RandomState> =
    ///     ProbingHashTable::with_capacity_and_hasher(5, RandomState::new());
    /// assert_eq!(table.capacity(), 5);
    /// ```
    #[inline]
    pub fn with_capacity_and_hasher(capacity: usize, build_hasher: H) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(normalize_capacity(capacity), || Slot::Empty);
        Self {
            slots,
            len: 0,
            tombstones: 0,
            build_hasher,
        }
    }

    /// Returns the number of entries in the [`ProbingHashTable`].
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ProbingHashTable;
    ///
    /// let mut table: ProbingHashTable<u64, u32> = ProbingHashTable::new();
    ///
    /// assert!(table.insert(1, 0).is_ok());
    /// assert_eq!(table.len(), 1);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the [`ProbingHashTable`] is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ProbingHashTable;
    ///
    /// let mut table: ProbingHashTable<u64, u32> = ProbingHashTable::new();
    ///
    /// assert!(table.is_empty());
    /// assert!(table.insert(1, 0).is_ok());
    /// assert!(!table.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ProbingHashTable;
    ///
    /// let mut table: ProbingHashTable<u64, u32> = ProbingHashTable::with_capacity(5);
    ///
    /// for k in 0..3 {
    ///     assert!(table.insert(k, 0).is_ok());
    /// }
    /// assert_eq!(table.capacity(), 5);
    ///
    /// assert!(table.insert(3, 0).is_ok());
    /// assert_eq!(table.capacity(), 10);
    /// ```
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the current load factor.
    #[allow(clippy::cast_precision_loss)]
    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.slots.len() as f64
    }

    /// Returns the number of tombstones.
    #[inline]
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Returns a reference to the specified [`BuildHasher`].
    #[inline]
    pub fn hasher(&self) -> &H {
        &self.build_hasher
    }

    /// Returns the [`SlotState`] of the slot at `index`.
    ///
    /// Returns `None` if `index` is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::{ProbingHashTable, SlotState};
    ///
    /// let mut table: ProbingHashTable<u64, u32> = ProbingHashTable::with_capacity(1);
    /// assert_eq!(table.slot_state(0), Some(SlotState::Empty));
    ///
    /// assert!(table.insert(1, 0).is_ok());
    /// assert!(table.remove(&1));
    /// let deleted = (0..table.capacity())
    ///     .filter(|i| table.slot_state(*i) == Some(SlotState::Deleted))
    ///     .count();
    /// assert_eq!(deleted, 1);
    /// assert!(table.slot_state(table.capacity()).is_none());
    /// ```
    #[inline]
    pub fn slot_state(&self, index: usize) -> Option<SlotState> {
        self.slots.get(index).map(Slot::state)
    }

    /// Returns an iterator over all the entries in an unspecified order.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ProbingHashTable;
    ///
    /// let mut table: ProbingHashTable<u64, u32> = ProbingHashTable::new();
    ///
    /// assert!(table.insert(1, 10).is_ok());
    /// assert!(table.insert(2, 20).is_ok());
    /// assert_eq!(table.iter().map(|(_, v)| v).sum::<u32>(), 30);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.len,
        }
    }

    /// Removes all the entries and tombstones without changing the capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ProbingHashTable;
    ///
    /// let mut table: ProbingHashTable<u64, u32> = ProbingHashTable::new();
    ///
    /// assert!(table.insert(1, 0).is_ok());
    /// assert!(table.insert(2, 0).is_ok());
    /// assert!(table.remove(&1));
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.tombstones(), 0);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = Slot::Empty);
        self.len = 0;
        self.tombstones = 0;
    }
}

impl<K, V, H> ProbingHashTable<K, V, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    /// Inserts a key-value pair into the [`ProbingHashTable`].
    ///
    /// Returns the previous value if the key was present; the key itself is not replaced.
    ///
    /// # Errors
    ///
    /// Returns an error along with the supplied key-value pair if the slot array had to be
    /// rebuilt and the new slot array could not be allocated. The table is left unchanged in
    /// that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ProbingHashTable;
    ///
    /// let mut table: ProbingHashTable<u64, u32> = ProbingHashTable::new();
    ///
    /// assert_eq!(table.insert(1, 0).ok(), Some(None));
    /// assert_eq!(table.insert(1, 1).ok(), Some(Some(0)));
    /// assert_eq!(table.search(&1), Some(&1));
    /// assert_eq!(table.len(), 1);
    /// ```
    #[inline]
    pub fn insert(&mut self, key: K, val: V) -> Result<Option<V>, InsertError<K, V>> {
        let hash = self.hash(&key);
        let index = match self.find_slot(&key, hash) {
            Probe::Found(index) => match &mut self.slots[index] {
                Slot::Occupied(_, v) => return Ok(Some(replace(v, val))),
                Slot::Empty | Slot::Deleted => unreachable!("slot {index} was resolved as found"),
            },
            Probe::Vacant(index) => index,
        };

        let capacity = self.slots.len();
        let rebuild = if self.needs_growth() {
            Some(grown_capacity(capacity))
        } else if self.slots[index].state() == SlotState::Empty
            && Self::MAX_LOAD.is_reached(self.len + self.tombstones + 1, capacity)
        {
            // Rebuilding in place must free at least half of the usable slots, otherwise the
            // table doubles.
            if Self::MAX_LOAD.is_reached(2 * (self.len + 1), capacity) {
                Some(grown_capacity(capacity))
            } else {
                Some(Ok(capacity))
            }
        } else {
            None
        };

        if let Some(new_capacity) = rebuild {
            if let Err(cause) = new_capacity.and_then(|c| self.resize_and_rehash(c)) {
                warn!("failed to rebuild the slot array: {cause}");
                return Err(InsertError::new(key, val, cause));
            }
            place(&mut self.slots, hash, key, val);
        } else {
            if self.slots[index].state() == SlotState::Deleted {
                self.tombstones -= 1;
            }
            self.slots[index] = Slot::Occupied(key, val);
        }
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
    /// use hashtab::ProbingHashTable;
    ///
    /// let mut table: ProbingHashTable<String, u32> = ProbingHashTable::new();
    ///
    /// assert!(table.insert("Charlie".to_string(), 75).is_ok());
    /// assert_eq!(table.search("Charlie"), Some(&75));
    /// assert!(table.search("Frank").is_none());
    /// ```
    #[inline]
    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        match self.find_slot(key, self.hash(key)) {
            Probe::Found(index) => self.slots[index].entry().map(|(_, v)| v),
            Probe::Vacant(_) => None,
        }
    }

    /// Returns a mutable reference to the value associated with the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ProbingHashTable;
    ///
    /// let mut table: ProbingHashTable<u64, u32> = ProbingHashTable::new();
    ///
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
        match self.find_slot(key, self.hash(key)) {
            Probe::Found(index) => self.slots[index].val_mut(),
            Probe::Vacant(_) => None,
        }
    }

    /// Returns `true` if the [`ProbingHashTable`] contains the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ProbingHashTable;
    ///
    /// let mut table: ProbingHashTable<u64, u32> = ProbingHashTable::new();
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

    /// Removes the entry associated with the key, leaving a tombstone behind.
    ///
    /// Returns `false` if the key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ProbingHashTable;
    ///
    /// let mut table: ProbingHashTable<u64, u32> = ProbingHashTable::new();
    ///
    /// assert!(!table.remove(&1));
    /// assert!(table.insert(1, 0).is_ok());
    /// assert!(table.remove(&1));
    /// assert_eq!(table.tombstones(), 1);
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
    /// use hashtab::ProbingHashTable;
    ///
    /// let mut table: ProbingHashTable<u64, u32> = ProbingHashTable::new();
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
        let Probe::Found(index) = self.find_slot(key, self.hash(key)) else {
            return None;
        };
        let removed = self.slots[index].delete()?;
        self.len -= 1;
        self.tombstones += 1;
        Some(removed)
    }

    /// Retains the entries specified by the predicate.
    ///
    /// Returns the number of removed entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ProbingHashTable;
    ///
    /// let mut table: ProbingHashTable<u64, u32> = ProbingHashTable::new();
    ///
    /// for k in 0..8 {
    ///     assert!(table.insert(k, 0).is_ok());
    /// }
    /// assert_eq!(table.retain(|k, _| k % 2 == 0), 4);
    /// assert_eq!(table.len(), 4);
    /// ```
    #[inline]
    pub fn retain<F: FnMut(&K, &mut V) -> bool>(&mut self, mut pred: F) -> usize {
        let mut removed = 0;
        for slot in &mut self.slots {
            let keep = match slot {
                Slot::Occupied(k, v) => pred(k, v),
                Slot::Empty | Slot::Deleted => true,
            };
            if !keep {
                slot.delete();
                removed += 1;
            }
        }
        self.len -= removed;
        self.tombstones += removed;
        removed
    }

    /// Resolves the slot for the key.
    ///
    /// The walk stops at the slot holding the key or at the first empty slot; tombstones never
    /// stop it. The first tombstone on the walk is preferred as the vacant slot.
    fn find_slot<Q>(&self, key: &Q, hash: u64) -> Probe
    where
        Q: Equivalent<K> + ?Sized,
    {
        let capacity = self.slots.len();
        let mut reusable = None;
        for index in LinearProbe::start(index_of(hash, capacity), capacity) {
            match &self.slots[index] {
                Slot::Empty => return Probe::Vacant(reusable.unwrap_or(index)),
                Slot::Occupied(k, _) => {
                    if key.equivalent(k) {
                        return Probe::Found(index);
                    }
                }
                Slot::Deleted => {
                    if reusable.is_none() {
                        reusable = Some(index);
                    }
                }
            }
        }
        match reusable {
            Some(index) => Probe::Vacant(index),
            None => unreachable!(
                "every one of {capacity} slots is occupied while the table holds {} entries",
                self.len
            ),
        }
    }

    /// Moves every entry into a new slot array of the given capacity.
    ///
    /// Tombstones are dropped; the new slot array is allocated before any entry is moved.
    fn resize_and_rehash(&mut self, new_capacity: usize) -> Result<(), GrowError> {
        let old_capacity = self.slots.len();
        let mut new_slots = allocate(new_capacity, || Slot::Empty)?;
        if new_capacity == old_capacity {
            debug!(
                "purging {} tombstones from {old_capacity} slots",
                self.tombstones
            );
        } else {
            debug!("resizing from {old_capacity} to {new_capacity} slots");
        }
        let mut reinserted = 0;
        for slot in &mut self.slots {
            if let Some((k, v)) = slot.take() {
                let hash = self.build_hasher.hash_one(&k);
                place(&mut new_slots, hash, k, v);
                reinserted += 1;
            }
        }
        debug_assert_eq!(reinserted, self.len);
        self.slots = new_slots;
        self.len = reinserted;
        self.tombstones = 0;
        Ok(())
    }
}

impl<K, V> ProbingHashTable<K, V, RandomState> {
    /// Creates an empty default [`ProbingHashTable`].
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ProbingHashTable;
    ///
    /// let table: ProbingHashTable<u64, u32> = ProbingHashTable::new();
    /// assert_eq!(table.capacity(), 16);
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty [`ProbingHashTable`] with the specified number of slots.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ProbingHashTable;
    ///
    /// let table: ProbingHashTable<u64, u32> = ProbingHashTable::with_capacity(0);
    /// assert_eq!(table.capacity(), 16);
    /// ```
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<K, V, H> Clone for ProbingHashTable<K, V, H>
where
    K: Clone,
    V: Clone,
    H: BuildHasher + Clone,
{
    /// Deep-copies the slot array, tombstones included.
    #[inline]
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            len: self.len,
            tombstones: self.tombstones,
            build_hasher: self.build_hasher.clone(),
        }
    }
}

impl<K, V, H> Debug for ProbingHashTable<K, V, H>
where
    K: Debug,
    V: Debug,
    H: BuildHasher,
{
    /// Prints the entries as a map, or every slot in order with the alternate flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ProbingHashTable;
    ///
    /// let mut table: ProbingHashTable<u64, u32> = ProbingHashTable::with_capacity(1);
    ///
    /// assert!(table.insert(1, 2).is_ok());
    /// assert_eq!(format!("{table:?}"), "{1: 2}");
    /// assert!(format!("{table:#?}").contains("Empty"));
    /// ```
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_list().entries(self.slots.iter()).finish()
        } else {
            f.debug_map().entries(self.iter()).finish()
        }
    }
}

impl<K, V, H> Default for ProbingHashTable<K, V, H>
where
    H: BuildHasher + Default,
{
    /// Creates an empty default [`ProbingHashTable`].
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ProbingHashTable;
    ///
    /// let table: ProbingHashTable<u64, u32> = ProbingHashTable::default();
    /// assert_eq!(table.capacity(), 16);
    /// ```
    #[inline]
    fn default() -> Self {
        Self::with_hasher(H::default())
    }
}

impl<K, V, H> Extend<(K, V)> for ProbingHashTable<K, V, H>
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

impl<K, V, H> FromIterator<(K, V)> for ProbingHashTable<K, V, H>
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

impl<K, V, H> HashTable<K, V, H> for ProbingHashTable<K, V, H>
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
        self.slots.len()
    }
}

impl<'h, K, V, H> IntoIterator for &'h ProbingHashTable<K, V, H>
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

impl<K, V, H> PartialEq for ProbingHashTable<K, V, H>
where
    K: Eq + Hash,
    V: PartialEq,
    H: BuildHasher,
{
    /// Compares two [`ProbingHashTable`] instances entry by entry.
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|(k, v)| other.search(k) == Some(v))
    }
}

impl<K, V, H> Eq for ProbingHashTable<K, V, H>
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
        let entry = self.slots.by_ref().find_map(Slot::entry)?;
        self.remaining -= 1;
        Some(entry)
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

/// Places an entry whose key is known to be absent into the first empty slot of its probe
/// sequence.
fn place<K, V>(slots: &mut [Slot<K, V>], hash: u64, key: K, val: V) {
    let capacity = slots.len();
    let Some(index) = LinearProbe::start(index_of(hash, capacity), capacity)
        .find(|i| matches!(slots[*i], Slot::Empty))
    else {
        unreachable!("no empty slot among {capacity} slots");
    };
    slots[index] = Slot::Occupied(key, val);
}
