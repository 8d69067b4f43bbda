#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Generic hash tables with two collision-resolution strategies.
//!
//! # [`ChainedHashTable`]
//! A hash table whose buckets are owned singly-linked chains of entries.
//!
//! # [`ProbingHashTable`]
//! An open-addressing hash table with linear probing and tombstones.
//!
//! Both tables grow by doubling their capacity once the load factor would reach its threshold,
//! and both report allocation failure during growth through [`InsertError`] without losing or
//! moving any entry.

#[cfg(not(feature = "equivalent"))]
mod equivalent;
#[cfg(not(feature = "equivalent"))]
pub use equivalent::Equivalent;
#[cfg(feature = "equivalent")]
pub use equivalent::Equivalent;

mod error;
pub use error::{GrowError, InsertError};

mod hash_table;
pub use hash_table::{LoadFactor, DEFAULT_CAPACITY};

pub mod chained_hash_table;
pub use chained_hash_table::ChainedHashTable;

pub mod probing_hash_table;
pub use probing_hash_table::{ProbingHashTable, SlotState};
