//! End-to-end behavior of the queue through its public API.

use std::cell::Cell;
use std::cmp::Ordering;
use std::rc::Rc;

use dualpq::{ChangeError, Empty, Order, OrderError, PriorityQueue};

/// Ordering strategy with a shared comparison budget, for forcing failures
/// at arbitrary points inside an operation.
#[derive(Clone)]
struct FailAfter {
    budget: Rc<Cell<u32>>,
}

impl FailAfter {
    fn new(budget: u32) -> (Self, Rc<Cell<u32>>) {
        let cell = Rc::new(Cell::new(budget));
        (
            Self {
                budget: Rc::clone(&cell),
            },
            cell,
        )
    }
}

impl<T: Ord> Order<T> for FailAfter {
    fn try_cmp(&self, a: &T, b: &T) -> Result<Ordering, OrderError> {
        let left = self.budget.get();
        if left == 0 {
            return Err(OrderError::new("comparison budget exhausted"));
        }
        self.budget.set(left - 1);
        Ok(a.cmp(b))
    }
}

fn drain_min<K, V, O>(queue: &mut PriorityQueue<K, V, O>) -> Vec<(K, V)>
where
    O: Order<K> + Order<V>,
{
    let mut out = Vec::new();
    while let Some(pair) = queue.delete_min() {
        out.push(pair);
    }
    out
}

#[test]
fn size_tracks_inserts_and_deletes() {
    let mut queue: PriorityQueue<u32, u32> = PriorityQueue::new();
    for i in 0..50 {
        queue.insert(i, (i * 7 + 13) % 23).unwrap();
        assert_eq!(queue.len(), (i + 1) as usize);
    }
    for i in (0..50usize).rev() {
        queue.delete_min();
        assert_eq!(queue.len(), i);
    }
    assert!(queue.is_empty());
}

#[test]
fn empty_queue_behavior() {
    let mut queue: PriorityQueue<u32, u32> = PriorityQueue::default();
    assert_eq!(queue.min_value(), Err(Empty));
    assert_eq!(queue.max_value(), Err(Empty));
    assert_eq!(queue.min_key(), Err(Empty));
    assert_eq!(queue.max_key(), Err(Empty));
    assert_eq!(queue.delete_min(), None);
    assert_eq!(queue.delete_max(), None);
}

#[test]
fn duplicate_keys_resolve_extremes_by_value() {
    let mut queue: PriorityQueue<u32, &str> = PriorityQueue::new();
    queue.insert(1, "a").unwrap();
    queue.insert(2, "b").unwrap();
    queue.insert(1, "c").unwrap();

    assert_eq!(queue.len(), 3);
    assert_eq!(queue.min_key(), Ok(&1));
    assert_eq!(queue.min_value(), Ok(&"a"));
    assert_eq!(queue.max_key(), Ok(&1));
    assert_eq!(queue.max_value(), Ok(&"c"));

    assert_eq!(queue.delete_min(), Some((1, "a")));
    assert_eq!(queue.min_value(), Ok(&"b"));
    assert_eq!(queue.max_value(), Ok(&"c"));
}

#[test]
fn single_element_min_equals_max() {
    let mut queue: PriorityQueue<u32, u32> = PriorityQueue::new();
    queue.insert(42, 7).unwrap();
    assert_eq!(queue.min_value(), queue.max_value());
    assert_eq!(queue.min_key(), queue.max_key());
    assert_eq!(queue.delete_max(), Some((42, 7)));
    assert!(queue.is_empty());
}

#[test]
fn drains_are_sorted_by_value() {
    let mut min_q: PriorityQueue<u32, u32> = PriorityQueue::new();
    let mut max_q: PriorityQueue<u32, u32> = PriorityQueue::new();
    for i in 0..500u32 {
        let value = (i * 37 + 11) % 101;
        min_q.insert(i, value).unwrap();
        max_q.insert(i, value).unwrap();
    }

    let ascending = drain_min(&mut min_q);
    for pair in ascending.windows(2) {
        assert!(pair[0].1 <= pair[1].1);
    }

    let mut last = u32::MAX;
    while let Some((_, v)) = max_q.delete_max() {
        assert!(v <= last);
        last = v;
    }
}

#[test]
fn change_value_targets_one_element_of_the_key_group() {
    let mut queue: PriorityQueue<u32, &str> = PriorityQueue::new();
    queue.insert(1, "a").unwrap();
    queue.insert(1, "c").unwrap();

    queue.change_value(&1, "z").unwrap();

    let drained = drain_min(&mut queue);
    assert_eq!(drained.len(), 2);
    assert!(drained.contains(&(1, "z")));
    assert!(drained.contains(&(1, "a")) ^ drained.contains(&(1, "c")));
}

#[test]
fn change_value_missing_key_returns_value() {
    let mut queue: PriorityQueue<u32, String> = PriorityQueue::new();
    queue.insert(1, "a".to_string()).unwrap();

    let err = queue.change_value(&9, "z".to_string()).unwrap_err();
    assert!(matches!(err, ChangeError::NotFound(_)));
    assert_eq!(err.into_value(), "z");
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.min_value().map(String::as_str), Ok("a"));
}

#[test]
fn change_value_reorders_the_queue() {
    let mut queue: PriorityQueue<&str, u32> = PriorityQueue::new();
    queue.insert("low", 1).unwrap();
    queue.insert("mid", 5).unwrap();
    queue.insert("high", 9).unwrap();

    queue.change_value(&"low", 100).unwrap();
    assert_eq!(queue.max_key(), Ok(&"low"));
    assert_eq!(queue.min_key(), Ok(&"mid"));

    queue.change_value(&"high", 0).unwrap();
    assert_eq!(queue.min_key(), Ok(&"high"));
}

#[test]
fn double_swap_is_identity() {
    let mut a: PriorityQueue<u32, u32> = PriorityQueue::new();
    let mut b: PriorityQueue<u32, u32> = PriorityQueue::new();
    for i in 0..8 {
        a.insert(i, i * 2).unwrap();
    }
    b.insert(99, 0).unwrap();
    let a0 = a.clone();
    let b0 = b.clone();

    a.swap(&mut b);
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 8);

    a.swap(&mut b);
    assert!(a == a0);
    assert!(b == b0);
}

#[test]
fn merge_adds_sizes_and_empties_source() {
    let mut a: PriorityQueue<u32, u32> = PriorityQueue::new();
    let mut b: PriorityQueue<u32, u32> = PriorityQueue::new();
    for i in 0..30 {
        a.insert(i, (i * 3 + 1) % 19).unwrap();
    }
    for i in 0..20 {
        b.insert(i + 100, (i * 5 + 2) % 17).unwrap();
    }

    a.merge(&mut b).unwrap();
    assert_eq!(a.len(), 50);
    assert!(b.is_empty());

    // Source stays usable after being drained by the merge.
    b.insert(7, 7).unwrap();
    assert_eq!(b.len(), 1);

    let drained = drain_min(&mut a);
    assert_eq!(drained.len(), 50);
    for pair in drained.windows(2) {
        assert!(pair[0].1 <= pair[1].1);
    }
}

#[test]
fn merge_preserves_duplicates_across_queues() {
    let mut a: PriorityQueue<u32, u32> = PriorityQueue::new();
    let mut b: PriorityQueue<u32, u32> = PriorityQueue::new();
    a.insert(1, 10).unwrap();
    b.insert(1, 10).unwrap();

    a.merge(&mut b).unwrap();
    assert_eq!(a.len(), 2);
    assert_eq!(drain_min(&mut a), vec![(1, 10), (1, 10)]);
}

#[test]
fn queue_equality_ignores_insertion_history() {
    let mut a: PriorityQueue<u32, u32> = PriorityQueue::new();
    let mut b: PriorityQueue<u32, u32> = PriorityQueue::new();
    for i in 0..10 {
        a.insert(i, i).unwrap();
    }
    for i in (0..10).rev() {
        b.insert(i, i).unwrap();
    }
    assert!(a == b);

    b.delete_min();
    assert!(a != b);
    assert!(a < b); // (0,0) sorts before (1,1)
}

#[test]
fn insert_failure_hands_the_pair_back() {
    let (order, budget) = FailAfter::new(u32::MAX);
    let mut queue: PriorityQueue<u32, u32, FailAfter> = PriorityQueue::with_order(order);
    for i in 0..8 {
        queue.insert(i, i).unwrap();
    }
    let snapshot = queue.clone();

    budget.set(0);
    let err = queue.insert(100, 200).unwrap_err();
    assert_eq!(err.into_pair(), (100, 200));

    budget.set(u32::MAX);
    assert!(queue.try_eq(&snapshot).unwrap());
}

#[test]
fn change_value_failure_leaves_queue_unchanged() {
    let (order, budget) = FailAfter::new(u32::MAX);
    let mut queue: PriorityQueue<u32, u32, FailAfter> = PriorityQueue::with_order(order);
    for i in 0..12 {
        queue.insert(i % 3, i * 2).unwrap();
    }
    let snapshot = queue.clone();

    budget.set(1);
    let err = queue.change_value(&1, 999).unwrap_err();
    assert!(matches!(err, ChangeError::Insert { .. }));
    assert_eq!(err.into_value(), 999);

    budget.set(u32::MAX);
    assert!(queue.try_eq(&snapshot).unwrap());
}

#[test]
fn merge_failure_restores_source_and_receiver() {
    let (order, budget) = FailAfter::new(u32::MAX);
    let mut a: PriorityQueue<u32, u32, FailAfter> = PriorityQueue::with_order(order.clone());
    let mut b: PriorityQueue<u32, u32, FailAfter> = PriorityQueue::with_order(order);
    for i in 0..10 {
        a.insert(i, i * 2 % 7).unwrap();
        b.insert(i + 20, i * 3 % 11).unwrap();
    }
    let a0 = a.clone();
    let b0 = b.clone();

    // Enough budget to transfer a few elements, not all of them.
    budget.set(40);
    a.merge(&mut b).unwrap_err();

    budget.set(u32::MAX);
    assert!(a.try_eq(&a0).unwrap());
    assert!(b.try_eq(&b0).unwrap());

    // Both queues stay fully functional.
    a.merge(&mut b).unwrap();
    assert_eq!(a.len(), 20);
    assert!(b.is_empty());
}

#[test]
fn interleaved_workload_stays_consistent() {
    let mut queue: PriorityQueue<u32, u32> = PriorityQueue::new();
    let mut expected_len = 0usize;

    for i in 0..2_000u32 {
        let key = (i * 13 + 7) % 61;
        let value = (i * 29 + 3) % 499;
        queue.insert(key, value).unwrap();
        expected_len += 1;

        match i % 7 {
            0 => {
                if queue.delete_min().is_some() {
                    expected_len -= 1;
                }
            }
            1 => {
                if queue.delete_max().is_some() {
                    expected_len -= 1;
                }
            }
            2 => {
                // Replacement keeps the size constant whether or not it hits.
                let _ = queue.change_value(&key, (value + 101) % 499);
            }
            _ => {}
        }
        assert_eq!(queue.len(), expected_len);
    }

    let drained = drain_min(&mut queue);
    assert_eq!(drained.len(), expected_len);
    for pair in drained.windows(2) {
        assert!(pair[0].1 <= pair[1].1);
    }
}
