use std::collections::HashSet;

use proptest::prelude::*;
use unified_set::StrategySet;
use unified_set::strategy::HashingStrategy;

const PROPTEST_CASES: u32 = 64;

/// Folds values onto a handful of hashes so most slots hold chains.
#[derive(Clone, Copy, Debug)]
struct FewHashes(u16);

impl HashingStrategy<u16> for FewHashes {
    fn hash(&self, value: &u16) -> u64 {
        u64::from(value % self.0)
    }

    fn equals(&self, a: &u16, b: &u16) -> bool {
        a == b
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u16),
    Remove(u16),
    Contains(u16),
    AddAll(Vec<u16>),
    RetainBelow(u16),
    CursorRemoveEven,
    Reserve(u8),
    Trim,
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0u16..512).prop_map(Op::Insert),
        4 => (0u16..512).prop_map(Op::Remove),
        2 => (0u16..512).prop_map(Op::Contains),
        1 => proptest::collection::vec(0u16..512, 0..32).prop_map(Op::AddAll),
        1 => (0u16..512).prop_map(Op::RetainBelow),
        1 => Just(Op::CursorRemoveEven),
        1 => any::<u8>().prop_map(Op::Reserve),
        1 => Just(Op::Trim),
        1 => Just(Op::Clear),
    ]
}

fn apply(set: &mut StrategySet<u16, FewHashes>, model: &mut HashSet<u16>, op: Op) {
    match op {
        Op::Insert(value) => assert_eq!(set.insert(value), model.insert(value)),
        Op::Remove(value) => assert_eq!(set.remove(&value), model.remove(&value)),
        Op::Contains(value) => assert_eq!(set.contains(&value), model.contains(&value)),
        Op::AddAll(values) => {
            let before = model.len();
            model.extend(values.iter().copied());
            assert_eq!(set.add_all(values), model.len() != before);
        }
        Op::RetainBelow(bound) => {
            set.retain(|&value| value < bound);
            model.retain(|&value| value < bound);
        }
        Op::CursorRemoveEven => {
            let mut cursor = set.cursor();
            while cursor.has_next() {
                let value = *cursor.next().unwrap();
                if value % 2 == 0 {
                    assert_eq!(cursor.remove().unwrap(), value);
                }
            }
            model.retain(|value| value % 2 != 0);
        }
        Op::Reserve(additional) => set.reserve(usize::from(additional)),
        Op::Trim => {
            set.trim_to_size();
        }
        Op::Clear => {
            set.clear();
            model.clear();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn op_sequence_matches_model(
        hashes in 1u16..64,
        load_factor in prop_oneof![Just(0.25f32), Just(0.5), Just(0.75), Just(1.0)],
        ops in proptest::collection::vec(op_strategy(), 0..256),
    ) {
        let mut set =
            StrategySet::with_capacity_load_factor_and_strategy(0, load_factor, FewHashes(hashes))
                .unwrap();
        let mut model = HashSet::new();

        for op in ops {
            apply(&mut set, &mut model, op);
            set.table().check_invariants();
            prop_assert_eq!(set.len(), model.len());
        }

        let mut values: Vec<u16> = set.iter().copied().collect();
        values.sort_unstable();
        let mut expected: Vec<u16> = model.into_iter().collect();
        expected.sort_unstable();
        prop_assert_eq!(values, expected);
    }

    #[test]
    fn capacity_stays_a_power_of_two(
        values in proptest::collection::vec(any::<u16>(), 0..600),
        initial in 0usize..300,
    ) {
        let mut set = StrategySet::with_capacity_and_strategy(initial, FewHashes(97));
        for value in &values {
            set.insert(*value);
            prop_assert!(set.capacity().is_power_of_two());
        }

        set.trim_to_size();
        prop_assert!(set.capacity().is_power_of_two());
        set.table().check_invariants();
        for value in &values {
            prop_assert!(set.contains(value));
        }
    }

    #[test]
    fn drain_yields_each_element_once(
        values in proptest::collection::hash_set(any::<u16>(), 0..200),
    ) {
        let mut set: StrategySet<u16, FewHashes> = StrategySet::with_strategy(FewHashes(7));
        set.add_all(values.iter().copied());

        let capacity = set.capacity();
        let drained: HashSet<u16> = set.drain().collect();
        prop_assert_eq!(drained, values);
        prop_assert!(set.is_empty());
        prop_assert_eq!(set.capacity(), capacity);
    }
}
