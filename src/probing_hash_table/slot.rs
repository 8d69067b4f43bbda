use std::mem::replace;

/// The observable state of a slot in a [`ProbingHashTable`](super::ProbingHashTable).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SlotState {
    /// The slot has never been used since the slot array was built.
    Empty,
    /// The slot holds a live entry.
    Occupied,
    /// The slot held an entry that was removed; probing continues past it.
    Deleted,
}

/// [`Slot`] is a single position in the slot array.
#[derive(Clone, Debug)]
pub(crate) enum Slot<K, V> {
    Empty,
    Occupied(K, V),
    Deleted,
}

impl<K, V> Slot<K, V> {
    /// Returns the [`SlotState`] of the slot.
    #[inline]
    pub(crate) const fn state(&self) -> SlotState {
        match self {
            Slot::Empty => SlotState::Empty,
            Slot::Occupied(..) => SlotState::Occupied,
            Slot::Deleted => SlotState::Deleted,
        }
    }

    /// Returns the entry if the slot is occupied.
    #[inline]
    pub(crate) const fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Slot::Occupied(k, v) => Some((k, v)),
            Slot::Empty | Slot::Deleted => None,
        }
    }

    /// Returns the value if the slot is occupied.
    #[inline]
    pub(crate) fn val_mut(&mut self) -> Option<&mut V> {
        match self {
            Slot::Occupied(_, v) => Some(v),
            Slot::Empty | Slot::Deleted => None,
        }
    }

    /// Leaves a tombstone behind and returns the entry.
    ///
    /// An empty or deleted slot is not modified.
    #[inline]
    pub(crate) fn delete(&mut self) -> Option<(K, V)> {
        if !matches!(self, Slot::Occupied(..)) {
            return None;
        }
        match replace(self, Slot::Deleted) {
            Slot::Occupied(k, v) => Some((k, v)),
            Slot::Empty | Slot::Deleted => None,
        }
    }

    /// Moves the entry out, leaving the slot empty.
    ///
    /// Only used while the slot array is being discarded.
    #[inline]
    pub(crate) fn take(&mut self) -> Option<(K, V)> {
        match replace(self, Slot::Empty) {
            Slot::Occupied(k, v) => Some((k, v)),
            Slot::Empty | Slot::Deleted => None,
        }
    }
}
