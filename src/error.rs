use std::collections::TryReserveError;
use std::fmt::{self, Debug, Display};

use thiserror::Error;

/// [`GrowError`] types.
///
/// Growth fails before any entry is relocated, therefore the table that failed to grow keeps
/// every entry it had.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GrowError {
    /// AllocationFailed: the new backing storage could not be allocated.
    #[error("failed to allocate backing storage for {capacity} entries")]
    AllocationFailed {
        /// The requested capacity.
        capacity: usize,
        /// The allocator error.
        #[source]
        source: TryReserveError,
    },
    /// CapacityOverflow: doubling the capacity overflows `usize`.
    #[error("capacity {capacity} cannot be doubled")]
    CapacityOverflow {
        /// The capacity that could not be doubled.
        capacity: usize,
    },
}

/// [`InsertError`] is returned when an insertion could not grow the table.
///
/// The rejected key-value pair is handed back to the caller.
pub struct InsertError<K, V> {
    key: K,
    val: V,
    cause: GrowError,
}

impl<K, V> InsertError<K, V> {
    #[inline]
    pub(crate) const fn new(key: K, val: V, cause: GrowError) -> Self {
        Self { key, val, cause }
    }

    /// Returns a reference to the rejected key.
    #[inline]
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Returns a reference to the rejected value.
    #[inline]
    pub const fn val(&self) -> &V {
        &self.val
    }

    /// Returns the reason the table could not grow.
    #[inline]
    pub const fn cause(&self) -> &GrowError {
        &self.cause
    }

    /// Takes the rejected key-value pair back.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtab::ChainedHashTable;
    ///
    /// let mut table: ChainedHashTable<u64, u32> = ChainedHashTable::new();
    /// if let Err(error) = table.insert(1, 0) {
    ///     let (key, val) = error.into_inner();
    ///     assert_eq!((key, val), (1, 0));
    /// }
    /// ```
    #[inline]
    pub fn into_inner(self) -> (K, V) {
        (self.key, self.val)
    }
}

impl<K, V> Debug for InsertError<K, V>
where
    K: Debug,
    V: Debug,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertError")
            .field("key", &self.key)
            .field("val", &self.val)
            .field("cause", &self.cause)
            .finish()
    }
}

impl<K, V> Display for InsertError<K, V> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "insertion rejected: {}", self.cause)
    }
}

impl<K, V> std::error::Error for InsertError<K, V>
where
    K: Debug,
    V: Debug,
{
    #[inline]
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}
