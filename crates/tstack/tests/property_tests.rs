//! Property-based tests for tstack.

use proptest::prelude::*;
use tstack::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Push(i64),
    Pop,
    Top,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<i64>().prop_map(Op::Push),
        2 => Just(Op::Pop),
        1 => Just(Op::Top),
    ]
}

fn growth() -> impl Strategy<Value = GrowthPolicy> {
    (2usize..=16, 1usize..=4)
        .prop_filter("factor must be in (1, 8]", |(num, den)| {
            num > den && *num <= den * 8
        })
        .prop_map(|(num, den)| GrowthPolicy::new(num, den))
}

// ============================================================================
// MODEL: the stack behaves like a Vec used as a stack
// ============================================================================

proptest! {
    #[test]
    fn matches_vec_model(ops in prop::collection::vec(op(), 0..300)) {
        let mut stack = Stack::new();
        let mut model: Vec<i64> = Vec::new();

        for op in ops {
            match op {
                Op::Push(value) => {
                    stack.push(value).unwrap();
                    model.push(value);
                }
                Op::Pop => match model.pop() {
                    Some(expected) => prop_assert_eq!(stack.pop().unwrap(), expected),
                    None => prop_assert!(stack.pop().unwrap_err().is_underflow()),
                },
                Op::Top => match model.last() {
                    Some(expected) => prop_assert_eq!(stack.top().unwrap(), expected),
                    None => prop_assert!(stack.top().unwrap_err().is_underflow()),
                },
            }
            prop_assert_eq!(stack.size(), model.len());
            prop_assert!(stack.size() <= stack.capacity());
        }

        prop_assert_eq!(stack.as_slice(), model.as_slice());
    }
}

// ============================================================================
// ROUND TRIP: push X then pop X leaves the stack empty, reversed output
// ============================================================================

proptest! {
    #[test]
    fn push_pop_round_trip(values in prop::collection::vec(any::<u16>(), 0..2000)) {
        let mut stack = Stack::new();
        stack.try_extend(values.iter().copied()).unwrap();

        let mut popped = Vec::with_capacity(values.len());
        for _ in 0..values.len() {
            popped.push(stack.pop().unwrap());
        }
        popped.reverse();

        prop_assert_eq!(popped, values);
        prop_assert!(stack.is_empty());
    }
}

// ============================================================================
// ALLOCATION: one live array, array form only, for any valid config
// ============================================================================

proptest! {
    #[test]
    fn one_live_array_for_any_config(
        base in 1usize..=32,
        policy in growth(),
        eager in any::<bool>(),
        n in 1usize..5000,
    ) {
        let config = StackConfig::default()
            .with_base_capacity(base)
            .with_growth(policy)
            .with_eager_allocation(eager);
        let counter = SystemAllocator::new().with_counting();
        let mut stack = Stack::with_config_in(config, &counter).unwrap();

        for i in 0..n {
            stack.push(i).unwrap();
        }

        let stats = counter.snapshot();
        prop_assert_eq!(stats.scalar_calls(), 0);
        prop_assert_eq!(stats.array_deallocations + 1, stats.array_allocations);
        prop_assert!(stats.max_growth_factor <= MAX_GROWTH_FACTOR);
        prop_assert!(stats.array_allocations <= n);
    }
}

// ============================================================================
// GROWTH POLICY: next_capacity is pure and strictly increasing
// ============================================================================

proptest! {
    #[test]
    fn next_capacity_strictly_increases(
        policy in growth(),
        base in 1usize..=32,
        current in 0usize..(1 << 40),
    ) {
        let next = policy.next_capacity(current, base).unwrap();
        prop_assert!(next > current);
        prop_assert_eq!(policy.next_capacity(current, base), Some(next));
    }

    #[test]
    fn next_capacity_respects_factor(policy in growth(), current in 1usize..(1 << 40)) {
        let next = policy.next_capacity(current, 32).unwrap();
        let ratio = next as f64 / current as f64;
        // rounding up and the +1 floor can only push small capacities over
        prop_assert!(ratio <= policy.factor() + 1.0);
        prop_assert!(ratio >= policy.factor() || next == current + 1);
    }
}
