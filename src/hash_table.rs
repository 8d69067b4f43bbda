use std::fmt;
use std::hash::{BuildHasher, Hash};

use log::trace;

use crate::GrowError;

/// The capacity of a table constructed without an explicit capacity.
pub const DEFAULT_CAPACITY: usize = 16;

/// [`LoadFactor`] is an exact `numerator / denominator` ratio.
///
/// Thresholds are compared with integer arithmetic so that a load factor of exactly `3/4` is
/// recognized as reaching `0.75`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LoadFactor {
    numerator: u32,
    denominator: u32,
}

impl LoadFactor {
    /// Creates a new [`LoadFactor`].
    ///
    /// # Panics
    ///
    /// Panics if `denominator` is zero or the ratio is not below `1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::LoadFactor;
    ///
    /// let load_factor = LoadFactor::new(3, 4);
    /// assert!(load_factor.is_reached(3, 4));
    /// assert!(!load_factor.is_reached(2, 4));
    /// ```
    #[inline]
    #[must_use]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        assert!(numerator < denominator, "a load factor must be below 1");
        Self {
            numerator,
            denominator,
        }
    }

    /// Returns `true` if `len` entries in `capacity` slots reach the load factor.
    #[inline]
    #[must_use]
    pub const fn is_reached(self, len: usize, capacity: usize) -> bool {
        len as u128 * self.denominator as u128 >= capacity as u128 * self.numerator as u128
    }

    /// Returns the load factor as a floating point number.
    #[allow(clippy::cast_precision_loss)]
    #[inline]
    #[must_use]
    pub fn ratio(self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

impl fmt::Display for LoadFactor {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// `HashTable` defines common functions for hash table implementations.
pub(crate) trait HashTable<K, V, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    /// The load factor that an insertion of a new key must not reach.
    const MAX_LOAD: LoadFactor;

    /// Returns a reference to its [`BuildHasher`].
    fn hasher(&self) -> &H;

    /// Returns the number of live entries.
    fn num_entries(&self) -> usize;

    /// Returns the number of buckets or slots.
    fn num_slots(&self) -> usize;

    /// Returns the hash value of the key.
    #[inline]
    fn hash<Q>(&self, key: &Q) -> u64
    where
        Q: Hash + ?Sized,
    {
        self.hasher().hash_one(key)
    }

    /// Returns `true` if the table has to grow before accepting one more entry.
    #[inline]
    fn needs_growth(&self) -> bool {
        Self::MAX_LOAD.is_reached(self.num_entries() + 1, self.num_slots())
    }
}

/// Maps a hash value onto `0..capacity`.
#[allow(clippy::cast_possible_truncation)] // The remainder is below `capacity`.
#[inline]
pub(crate) const fn index_of(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

/// Replaces a zero capacity with [`DEFAULT_CAPACITY`].
#[inline]
pub(crate) const fn normalize_capacity(capacity: usize) -> usize {
    if capacity == 0 {
        DEFAULT_CAPACITY
    } else {
        capacity
    }
}

/// Returns the doubled capacity.
#[inline]
pub(crate) fn grown_capacity(capacity: usize) -> Result<usize, GrowError> {
    capacity
        .checked_mul(2)
        .ok_or(GrowError::CapacityOverflow { capacity })
}

/// Allocates a fully initialized array of `capacity` elements.
///
/// The array is either allocated as a whole or not at all.
pub(crate) fn allocate<T, F: FnMut() -> T>(capacity: usize, init: F) -> Result<Vec<T>, GrowError> {
    trace!("allocating {capacity} elements");
    let mut array = Vec::new();
    array
        .try_reserve_exact(capacity)
        .map_err(|source| GrowError::AllocationFailed { capacity, source })?;
    array.resize_with(capacity, init);
    Ok(array)
}
