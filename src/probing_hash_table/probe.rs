// A linear probe sequence.
//
// The sequence visits every slot exactly once, starting at the home slot of a hash value and
// wrapping around the end of the slot array.
#[derive(Clone, Debug)]
pub(crate) struct LinearProbe {
    // The index of the next slot to visit.
    index: usize,
    // The number of slots in the table.
    capacity: usize,
    // The number of slots left to visit.
    remaining: usize,
}

impl LinearProbe {
    // Starts the probe sequence at `home`.
    #[inline]
    pub(crate) const fn start(home: usize, capacity: usize) -> LinearProbe {
        debug_assert!(home < capacity);
        LinearProbe {
            index: home,
            capacity,
            remaining: capacity,
        }
    }
}

impl Iterator for LinearProbe {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.index;
        self.remaining -= 1;
        self.index += 1;
        if self.index == self.capacity {
            self.index = 0;
        }
        Some(index)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for LinearProbe {}
