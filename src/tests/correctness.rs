use std::collections::HashMap;

use proptest::prelude::*;

use crate::tests::IdentityState;
use crate::{ChainedHashTable, ProbingHashTable};

#[derive(Clone, Debug)]
enum Op {
    Insert(u64, u64),
    Remove(u64),
    Search(u64),
}

fn ops(key_range: u64) -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        3 => (0..key_range, any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (0..key_range).prop_map(Op::Remove),
        1 => (0..key_range).prop_map(Op::Search),
    ];
    prop::collection::vec(op, 0..512)
}

// Keys sharing the low bits pile up in the same bucket or probe run under the identity hasher.
fn colliding_ops() -> impl Strategy<Value = Vec<Op>> {
    ops(64).prop_map(|ops| {
        ops.into_iter()
            .map(|op| match op {
                Op::Insert(k, v) => Op::Insert(k << 8, v),
                Op::Remove(k) => Op::Remove(k << 8),
                Op::Search(k) => Op::Search(k << 8),
            })
            .collect()
    })
}

macro_rules! check_against_model {
    ($table:expr, $ops:expr) => {{
        let mut table = $table;
        let mut model: HashMap<u64, u64> = HashMap::new();
        for op in $ops {
            match op {
                Op::Insert(k, v) => {
                    prop_assert_eq!(table.insert(k, v).ok(), Some(model.insert(k, v)));
                }
                Op::Remove(k) => {
                    prop_assert_eq!(table.remove(&k), model.remove(&k).is_some());
                }
                Op::Search(k) => {
                    prop_assert_eq!(table.search(&k), model.get(&k));
                }
            }
            prop_assert_eq!(table.len(), model.len());
        }
        prop_assert_eq!(table.iter().count(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(table.search(k), Some(v));
        }
        table
    }};
}

proptest! {
    #[cfg_attr(miri, ignore)]
    #[test]
    fn chained_matches_model(capacity in 0_usize..32, ops in ops(256)) {
        let table: ChainedHashTable<u64, u64> = ChainedHashTable::with_capacity(capacity);
        let table = check_against_model!(table, ops);
        prop_assert!(table.len() * 4 < table.capacity() * 3);
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn chained_matches_model_with_collisions(capacity in 1_usize..8, ops in colliding_ops()) {
        let table: ChainedHashTable<u64, u64, IdentityState> =
            ChainedHashTable::with_capacity_and_hasher(capacity, IdentityState::default());
        let table = check_against_model!(table, ops);
        let chained: usize = (0..table.capacity())
            .filter_map(|i| table.bucket(i))
            .map(Iterator::count)
            .sum();
        prop_assert_eq!(chained, table.len());
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn probing_matches_model(capacity in 0_usize..32, ops in ops(256)) {
        let table: ProbingHashTable<u64, u64> = ProbingHashTable::with_capacity(capacity);
        let table = check_against_model!(table, ops);
        prop_assert!((table.len() + table.tombstones()) * 10 < table.capacity() * 7);
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn probing_matches_model_with_collisions(capacity in 1_usize..8, ops in colliding_ops()) {
        let table: ProbingHashTable<u64, u64, IdentityState> =
            ProbingHashTable::with_capacity_and_hasher(capacity, IdentityState::default());
        let table = check_against_model!(table, ops);
        let (mut occupied, mut deleted) = (0, 0);
        for i in 0..table.capacity() {
            match table.slot_state(i) {
                Some(crate::SlotState::Occupied) => occupied += 1,
                Some(crate::SlotState::Deleted) => deleted += 1,
                Some(crate::SlotState::Empty) | None => (),
            }
        }
        prop_assert_eq!(occupied, table.len());
        prop_assert_eq!(deleted, table.tombstones());
    }
}
