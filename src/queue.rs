//! The dual-indexed associative priority queue.

use core::cmp::Ordering;
use core::fmt;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::arena::{Arena, Handle};
use crate::error::{ChangeError, Empty, InsertError, MergeError};
use crate::index::{random_level, Element, Lane, Links, SkipIndex, FRONT, MAX_LEVEL};
use crate::order::{NaturalOrder, Order, OrderError};

/// Panic message for the one contract violation the queue cannot report:
/// the ordering strategy failing on values it has already ordered.
const STORED_CMP: &str = "ordering strategy failed on values already stored in the queue";

/// Fixed RNG seed: tower heights, and therefore which of several
/// same-keyed elements `change_value` picks, are reproducible for a given
/// sequence of operations.
const RNG_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// An associative priority queue over (key, value) pairs.
///
/// Duplicate keys, duplicate values, and fully duplicate pairs are all
/// stored as distinct elements. Two internal indices view the same element
/// arena: one ordered by (value, key) for O(1) min/max access, one ordered
/// by (key, value) for O(log n) lookup by key. Every mutation keeps both
/// views consistent, and every fallible operation provides the strong
/// guarantee: on error, the queue's observable state is exactly what it
/// was before the call.
///
/// Ordering of keys and values comes from an injected [`Order`] strategy;
/// the default [`NaturalOrder`] uses `Ord` and never fails.
///
/// # Example
///
/// ```
/// use dualpq::PriorityQueue;
///
/// let mut queue: PriorityQueue<u32, &str> = PriorityQueue::new();
/// queue.insert(1, "a").unwrap();
/// queue.insert(2, "b").unwrap();
/// queue.insert(1, "c").unwrap();
///
/// // Ordered by value first: "a" < "b" < "c".
/// assert_eq!(queue.min_value(), Ok(&"a"));
/// assert_eq!(queue.max_value(), Ok(&"c"));
/// assert_eq!(queue.min_key(), Ok(&1));
/// assert_eq!(queue.max_key(), Ok(&1));
///
/// assert_eq!(queue.delete_min(), Some((1, "a")));
/// assert_eq!(queue.min_value(), Ok(&"b"));
/// ```
pub struct PriorityQueue<K, V, O = NaturalOrder> {
    arena: Arena<Element<K, V>>,
    by_value: SkipIndex,
    by_key: SkipIndex,
    order: O,
    rng: SmallRng,
}

/// Undo token for one transferred element of a `merge`.
///
/// Positions are predecessor sets recorded at the moment the step was
/// applied; replaying them in reverse order re-creates the exact structure
/// they were recorded against, so rollback never compares anything.
struct Transfer {
    src: Handle,
    src_key_update: Links,
    dst: Handle,
    dst_value_update: Links,
    dst_key_update: Links,
}

impl<K, V> PriorityQueue<K, V, NaturalOrder> {
    /// Creates an empty queue ordered by the `Ord` impls of `K` and `V`.
    pub fn new() -> Self {
        Self::with_order(NaturalOrder)
    }
}

impl<K, V, O> PriorityQueue<K, V, O> {
    /// Creates an empty queue with an injected ordering strategy.
    pub fn with_order(order: O) -> Self {
        Self {
            arena: Arena::new(),
            by_value: SkipIndex::new(Lane::ByValue),
            by_key: SkipIndex::new(Lane::ByKey),
            order,
            rng: SmallRng::seed_from_u64(RNG_SEED),
        }
    }

    /// Returns the number of stored elements. O(1).
    #[inline]
    pub fn len(&self) -> usize {
        self.by_value.len()
    }

    /// Returns `true` if the queue holds no elements. O(1).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exchanges the contents of two queues. O(1), never fails.
    ///
    /// The ordering strategies travel with their contents. Swapping a
    /// queue with itself is not expressible (two exclusive borrows of one
    /// queue cannot coexist), so the self-swap case needs no handling.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// The smallest stored value. O(1).
    pub fn min_value(&self) -> Result<&V, Empty> {
        self.extreme(self.by_value.first()).map(|e| &e.value)
    }

    /// The largest stored value. O(1).
    pub fn max_value(&self) -> Result<&V, Empty> {
        self.extreme(self.by_value.last()).map(|e| &e.value)
    }

    /// The key of the element holding the smallest value. O(1).
    pub fn min_key(&self) -> Result<&K, Empty> {
        self.extreme(self.by_value.first()).map(|e| &e.key)
    }

    /// The key of the element holding the largest value. O(1).
    pub fn max_key(&self) -> Result<&K, Empty> {
        self.extreme(self.by_value.last()).map(|e| &e.key)
    }

    fn extreme(&self, handle: Handle) -> Result<&Element<K, V>, Empty> {
        if handle.is_none() {
            return Err(Empty);
        }
        Ok(self.arena.get(handle).expect("stale handle"))
    }

    fn counts_agree(&self) -> bool {
        self.by_value.len() == self.arena.len() && self.by_key.len() == self.arena.len()
    }
}

impl<K, V, O> PriorityQueue<K, V, O>
where
    O: Order<K> + Order<V>,
{
    /// Inserts a (key, value) pair as a new element. O(log n) expected.
    ///
    /// Duplicates of key, value, or both are permitted and stored as
    /// distinct elements.
    ///
    /// Positions in both indices are searched before either is touched;
    /// linking itself cannot fail. If the ordering strategy fails during
    /// either search, the pair is handed back in the error and the queue
    /// is unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use dualpq::PriorityQueue;
    ///
    /// let mut queue: PriorityQueue<u32, u32> = PriorityQueue::new();
    /// queue.insert(7, 100).unwrap();
    /// queue.insert(7, 100).unwrap(); // same pair, second element
    /// assert_eq!(queue.len(), 2);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<(), InsertError<K, V>> {
        let value_level = random_level(&mut self.rng);
        let key_level = random_level(&mut self.rng);
        let handle = self
            .arena
            .insert(Element::new(key, value, value_level, key_level));

        let mut up_value = FRONT;
        let mut up_key = FRONT;
        let seeks = self
            .by_value
            .seek_element(&self.arena, &self.order, handle, &mut up_value)
            .and_then(|()| {
                self.by_key
                    .seek_element(&self.arena, &self.order, handle, &mut up_key)
            });

        match seeks {
            Ok(()) => {
                self.by_value.splice(&mut self.arena, handle, &up_value);
                self.by_key.splice(&mut self.arena, handle, &up_key);
                debug_assert!(self.counts_agree());
                Ok(())
            }
            Err(source) => {
                // Nothing was linked; dropping the arena slot restores the
                // pre-call state and lets us return the pair.
                let elem = self.arena.remove(handle).expect("stale handle");
                Err(InsertError {
                    key: elem.key,
                    value: elem.value,
                    source,
                })
            }
        }
    }

    /// Removes and returns the element with the smallest value, or `None`
    /// if the queue is empty. O(log n) expected.
    ///
    /// An empty queue is a silent no-op — draining to empty is the
    /// expected pattern, so unlike the extreme accessors this never
    /// reports [`Empty`](crate::Empty).
    ///
    /// # Panics
    ///
    /// Panics if the ordering strategy fails while re-locating the element
    /// in the key index; comparisons of already-stored values are required
    /// to succeed (see [`Order`]).
    pub fn delete_min(&mut self) -> Option<(K, V)> {
        let handle = self.by_value.first();
        if handle.is_none() {
            return None;
        }

        let mut up_key = FRONT;
        self.by_key
            .seek_element(&self.arena, &self.order, handle, &mut up_key)
            .expect(STORED_CMP);

        // The minimum has no predecessors in the value index.
        self.by_value.unlink(&mut self.arena, handle, &FRONT);
        self.by_key.unlink(&mut self.arena, handle, &up_key);

        let elem = self.arena.remove(handle).expect("stale handle");
        debug_assert!(self.counts_agree());
        Some((elem.key, elem.value))
    }

    /// Removes and returns the element with the largest value, or `None`
    /// if the queue is empty. O(log n) expected.
    ///
    /// Same contract as [`delete_min`](Self::delete_min).
    pub fn delete_max(&mut self) -> Option<(K, V)> {
        let handle = self.by_value.last();
        if handle.is_none() {
            return None;
        }

        let mut up_value = FRONT;
        let mut up_key = FRONT;
        self.by_value
            .seek_element(&self.arena, &self.order, handle, &mut up_value)
            .expect(STORED_CMP);
        self.by_key
            .seek_element(&self.arena, &self.order, handle, &mut up_key)
            .expect(STORED_CMP);

        self.by_value.unlink(&mut self.arena, handle, &up_value);
        self.by_key.unlink(&mut self.arena, handle, &up_key);

        let elem = self.arena.remove(handle).expect("stale handle");
        debug_assert!(self.counts_agree());
        Some((elem.key, elem.value))
    }

    /// Replaces the value of one element currently holding `key`.
    /// O(log n) expected.
    ///
    /// When several elements share the key, the one with the smallest
    /// value is chosen — unspecified to callers beyond being deterministic
    /// for a given internal state. The chosen element keeps its key
    /// instance and identity; only its value is replaced.
    ///
    /// All four positions involved (the element's current place in both
    /// indices and the replacement's place in both indices) are computed
    /// before anything is unlinked, so a failing ordering strategy returns
    /// [`ChangeError::Insert`] with the queue untouched; the commit phase
    /// performs no comparisons and cannot fail.
    ///
    /// # Example
    ///
    /// ```
    /// use dualpq::PriorityQueue;
    ///
    /// let mut queue: PriorityQueue<u32, &str> = PriorityQueue::new();
    /// queue.insert(1, "a").unwrap();
    /// queue.insert(1, "c").unwrap();
    ///
    /// queue.change_value(&1, "z").unwrap();
    /// assert_eq!(queue.len(), 2);
    /// assert_eq!(queue.max_value(), Ok(&"z"));
    /// assert_eq!(queue.min_value(), Ok(&"c")); // the other element kept its value
    /// ```
    pub fn change_value(&mut self, key: &K, value: V) -> Result<(), ChangeError<V>> {
        // Locate the target: the head of the key group.
        let mut up_key_old = FRONT;
        let found = match self
            .by_key
            .seek_key(&self.arena, &self.order, key, &mut up_key_old)
        {
            Ok(found) => found,
            Err(source) => return Err(ChangeError::Insert { value, source }),
        };
        let Some(handle) = found else {
            return Err(ChangeError::NotFound(value));
        };

        // Validate: predecessors of the element's current position in the
        // value index, and of the replacement pair's position in both
        // indices. No mutation until all succeed.
        let mut up_value_old = FRONT;
        if let Err(source) =
            self.by_value
                .seek_element(&self.arena, &self.order, handle, &mut up_value_old)
        {
            return Err(ChangeError::Insert { value, source });
        }

        let mut up_value_new = FRONT;
        let mut up_key_new = FRONT;
        {
            let target = self.arena.get(handle).expect("stale handle");
            let order = &self.order;

            let seek = self.by_value.seek_with(
                &self.arena,
                |h, node| {
                    let mut ord = order.try_cmp(&node.value, &value)?;
                    if ord == Ordering::Equal {
                        ord = order.try_cmp(&node.key, &target.key)?;
                    }
                    if ord == Ordering::Equal {
                        ord = h.cmp(&handle);
                    }
                    Ok(ord == Ordering::Less)
                },
                &mut up_value_new,
            );
            if let Err(source) = seek {
                return Err(ChangeError::Insert { value, source });
            }

            let seek = self.by_key.seek_with(
                &self.arena,
                |h, node| {
                    let mut ord = order.try_cmp(&node.key, &target.key)?;
                    if ord == Ordering::Equal {
                        ord = order.try_cmp(&node.value, &value)?;
                    }
                    if ord == Ordering::Equal {
                        ord = h.cmp(&handle);
                    }
                    Ok(ord == Ordering::Less)
                },
                &mut up_key_new,
            );
            if let Err(source) = seek {
                return Err(ChangeError::Insert { value, source });
            }
        }

        // Commit: comparison-free. The new-position predecessor sets may
        // name the element itself (its old position precedes its new one);
        // after unlinking, its own predecessors take that place.
        let up_value_new = patched(&up_value_new, handle, &up_value_old);
        let up_key_new = patched(&up_key_new, handle, &up_key_old);

        self.by_key.unlink(&mut self.arena, handle, &up_key_old);
        self.by_value.unlink(&mut self.arena, handle, &up_value_old);
        self.arena.get_mut(handle).expect("stale handle").value = value;
        self.by_value.splice(&mut self.arena, handle, &up_value_new);
        self.by_key.splice(&mut self.arena, handle, &up_key_new);

        debug_assert!(self.counts_agree());
        Ok(())
    }

    /// Transfers every element of `other` into `self`, leaving `other`
    /// empty. O(m log(n + m)) for m elements transferred into n.
    ///
    /// Elements are moved, not copied: the owned keys and values travel
    /// between arenas, and positions in `self` are decided by `self`'s
    /// ordering strategy. Merging a queue into itself is not expressible
    /// (the two exclusive borrows cannot alias).
    ///
    /// The strong guarantee spans both queues: on failure, every partial
    /// insertion into `self` is undone and every element already taken
    /// from `other` is respliced at its original position, using recorded
    /// predecessor sets rather than comparisons. Only then is the error
    /// surfaced.
    ///
    /// # Example
    ///
    /// ```
    /// use dualpq::PriorityQueue;
    ///
    /// let mut a: PriorityQueue<u32, u32> = PriorityQueue::new();
    /// let mut b: PriorityQueue<u32, u32> = PriorityQueue::new();
    /// a.insert(1, 10).unwrap();
    /// b.insert(2, 5).unwrap();
    /// b.insert(3, 20).unwrap();
    ///
    /// a.merge(&mut b).unwrap();
    /// assert_eq!(a.len(), 3);
    /// assert!(b.is_empty());
    /// assert_eq!(a.min_value(), Ok(&5));
    /// ```
    pub fn merge(&mut self, other: &mut Self) -> Result<(), MergeError> {
        let mut log: Vec<Transfer> = Vec::with_capacity(other.len());

        loop {
            let src = other.by_value.first();
            if src.is_none() {
                break;
            }

            // Record where the element sits in the source key index; its
            // value-index position is the front by construction.
            let mut src_key_update = FRONT;
            if let Err(source) =
                other
                    .by_key
                    .seek_element(&other.arena, &other.order, src, &mut src_key_update)
            {
                self.rollback(other, &mut log);
                return Err(MergeError { source });
            }

            // Detach from the source.
            other.by_value.unlink(&mut other.arena, src, &FRONT);
            other.by_key.unlink(&mut other.arena, src, &src_key_update);
            let elem = other.arena.remove(src).expect("stale handle");

            // Attach to the receiver: validate both positions, then splice.
            let dst = self.arena.insert(elem);
            let mut dst_value_update = FRONT;
            let mut dst_key_update = FRONT;
            let seeks = self
                .by_value
                .seek_element(&self.arena, &self.order, dst, &mut dst_value_update)
                .and_then(|()| {
                    self.by_key
                        .seek_element(&self.arena, &self.order, dst, &mut dst_key_update)
                });
            if let Err(source) = seeks {
                let elem = self.arena.remove(dst).expect("stale handle");
                Self::restore(other, elem, src, &src_key_update);
                self.rollback(other, &mut log);
                return Err(MergeError { source });
            }
            self.by_value.splice(&mut self.arena, dst, &dst_value_update);
            self.by_key.splice(&mut self.arena, dst, &dst_key_update);

            log.push(Transfer {
                src,
                src_key_update,
                dst,
                dst_value_update,
                dst_key_update,
            });
        }

        debug_assert!(self.counts_agree());
        Ok(())
    }

    /// Puts one element back into `other` at its recorded position.
    ///
    /// The arena's LIFO slot reuse guarantees the element regains its
    /// original handle, so the recorded predecessor handles still describe
    /// the surrounding structure.
    fn restore(other: &mut Self, elem: Element<K, V>, src: Handle, src_key_update: &Links) {
        let back = other.arena.insert(elem);
        debug_assert_eq!(back, src, "arena slot reuse must be LIFO");
        other.by_key.splice(&mut other.arena, back, src_key_update);
        other.by_value.splice(&mut other.arena, back, &FRONT);
    }

    /// Replays merge undo tokens in reverse, restoring both queues.
    fn rollback(&mut self, other: &mut Self, log: &mut Vec<Transfer>) {
        while let Some(t) = log.pop() {
            self.by_key.unlink(&mut self.arena, t.dst, &t.dst_key_update);
            self.by_value
                .unlink(&mut self.arena, t.dst, &t.dst_value_update);
            let elem = self.arena.remove(t.dst).expect("stale handle");
            Self::restore(other, elem, t.src, &t.src_key_update);
        }
    }

    /// Compares two queues lexicographically as sequences of (value, key)
    /// pairs in value order, using `self`'s ordering strategy.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering, OrderError> {
        let mut a = self.by_value.first();
        let mut b = other.by_value.first();
        loop {
            let (ea, eb) = match (a.is_some(), b.is_some()) {
                (false, false) => return Ok(Ordering::Equal),
                (false, true) => return Ok(Ordering::Less),
                (true, false) => return Ok(Ordering::Greater),
                (true, true) => (
                    self.arena.get(a).expect("stale link"),
                    other.arena.get(b).expect("stale link"),
                ),
            };
            let ord = self.order.try_cmp(&ea.value, &eb.value)?;
            if ord != Ordering::Equal {
                return Ok(ord);
            }
            let ord = self.order.try_cmp(&ea.key, &eb.key)?;
            if ord != Ordering::Equal {
                return Ok(ord);
            }
            a = ea.next(Lane::ByValue);
            b = eb.next(Lane::ByValue);
        }
    }

    /// Returns `true` if both queues hold element-wise equal (value, key)
    /// sequences in value order.
    pub fn try_eq(&self, other: &Self) -> Result<bool, OrderError> {
        if self.len() != other.len() {
            return Ok(false);
        }
        Ok(self.try_cmp(other)? == Ordering::Equal)
    }

    /// Asserts every structural invariant; test support.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert_eq!(self.by_value.len(), self.arena.len());
        assert_eq!(self.by_key.len(), self.arena.len());

        let mut handles_v = self.walk_sorted(Lane::ByValue, &self.by_value);
        let mut handles_k = self.walk_sorted(Lane::ByKey, &self.by_key);
        handles_v.sort_unstable();
        handles_k.sort_unstable();
        assert_eq!(handles_v, handles_k, "indices disagree on element set");
    }

    #[cfg(test)]
    fn walk_sorted(&self, lane: Lane, index: &SkipIndex) -> Vec<Handle> {
        let mut handles = Vec::new();
        let mut prev = Handle::NONE;
        let mut h = index.first();
        while h.is_some() {
            if prev.is_some() {
                let ord = lane
                    .cmp_elements(
                        &self.order,
                        self.arena.get(prev).unwrap(),
                        prev,
                        self.arena.get(h).unwrap(),
                        h,
                    )
                    .expect(STORED_CMP);
                assert_eq!(ord, Ordering::Less, "lane order violated");
            }
            handles.push(h);
            prev = h;
            h = self.arena.get(h).unwrap().next(lane);
        }
        assert_eq!(handles.len(), index.len());
        assert_eq!(index.last(), prev);
        handles
    }
}

/// Substitutes an element's own predecessors for any slot in `update` that
/// names the element itself.
fn patched(update: &Links, handle: Handle, own: &Links) -> Links {
    let mut out = *update;
    for i in 0..MAX_LEVEL {
        if out[i] == handle {
            out[i] = own[i];
        }
    }
    out
}

impl<K, V> Default for PriorityQueue<K, V, NaturalOrder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, O> Clone for PriorityQueue<K, V, O>
where
    K: Clone,
    V: Clone,
    O: Clone,
{
    /// Deep-copies the queue structurally: arena slots, towers, and index
    /// headers are replicated as-is, so no comparisons are made and
    /// handles are preserved.
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            by_value: self.by_value.clone(),
            by_key: self.by_key.clone(),
            order: self.order.clone(),
            rng: self.rng.clone(),
        }
    }
}

impl<K, V, O> PartialEq for PriorityQueue<K, V, O>
where
    O: Order<K> + Order<V>,
{
    /// Element-wise equality of the value-ordered sequences. A failing
    /// ordering strategy yields `false`; use
    /// [`try_eq`](PriorityQueue::try_eq) to observe the failure.
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other).unwrap_or(false)
    }
}

impl<K, V, O> PartialOrd for PriorityQueue<K, V, O>
where
    O: Order<K> + Order<V>,
{
    /// Lexicographic comparison of the value-ordered sequences. A failing
    /// ordering strategy yields `None`; use
    /// [`try_cmp`](PriorityQueue::try_cmp) to observe the failure.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl<K, V, O> fmt::Debug for PriorityQueue<K, V, O>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        let mut h = self.by_value.first();
        while h.is_some() {
            let e = self.arena.get(h).expect("stale link");
            list.entry(&(&e.key, &e.value));
            h = e.next(Lane::ByValue);
        }
        list.finish()
    }
}
