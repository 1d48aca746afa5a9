//! Skip index — a probabilistic ordered view over the element arena.
//!
//! Both views of the queue are instances of [`SkipIndex`]: the value index
//! orders elements by (value, key, handle), the key index by (key, value,
//! handle). The handle tie-break makes each order strict, so duplicates of
//! key, value, or both coexist as distinct, individually addressable
//! elements.
//!
//! Each element embeds one forward-pointer tower per index; the index
//! itself holds only head pointers, a tail, and a length:
//!
//! ```text
//! Level 2:  HEAD ─────────────────────► e3 ─────────────► NIL
//! Level 1:  HEAD ────────► e1 ─────────► e3 ─────────────► NIL
//! Level 0:  HEAD ──► e0 ──► e1 ──► e2 ──► e3 ──► e4 ─────► NIL
//! ```
//!
//! Mutations are split into a fallible search phase ([`SkipIndex::seek_with`],
//! which only reads) and infallible structural phases ([`SkipIndex::splice`],
//! [`SkipIndex::unlink`], which never compare). The queue exploits this
//! split for its rollback guarantees: once predecessors are known, linking
//! and unlinking cannot fail, and an element can be put back exactly where
//! it was without consulting the comparator again.

use core::cmp::Ordering;

use rand::rngs::SmallRng;
use rand::RngCore;

use crate::arena::{Arena, Handle};
use crate::order::{Order, OrderError};

/// Maximum tower height. Sixteen levels keep searches efficient up to
/// roughly 65K elements at p = 0.5.
pub(crate) const MAX_LEVEL: usize = 16;

/// Predecessor handles at each level, as filled by a seek.
pub(crate) type Links = [Handle; MAX_LEVEL];

/// An all-`NONE` predecessor array: the position at the very front.
pub(crate) const FRONT: Links = [Handle::NONE; MAX_LEVEL];

/// Which of the two embedded towers (and orderings) an index uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lane {
    /// Ordered by (value, key, handle).
    ByValue = 0,
    /// Ordered by (key, value, handle).
    ByKey = 1,
}

impl Lane {
    /// Compares two elements under this lane's order.
    ///
    /// Handles break ties among equal (primary, secondary) pairs, so two
    /// distinct elements never compare equal.
    pub(crate) fn cmp_elements<K, V, O>(
        self,
        order: &O,
        a: &Element<K, V>,
        ha: Handle,
        b: &Element<K, V>,
        hb: Handle,
    ) -> Result<Ordering, OrderError>
    where
        O: Order<K> + Order<V>,
    {
        let primary = match self {
            Lane::ByValue => order.try_cmp(&a.value, &b.value)?,
            Lane::ByKey => order.try_cmp(&a.key, &b.key)?,
        };
        if primary != Ordering::Equal {
            return Ok(primary);
        }
        let secondary = match self {
            Lane::ByValue => order.try_cmp(&a.key, &b.key)?,
            Lane::ByKey => order.try_cmp(&a.value, &b.value)?,
        };
        if secondary != Ordering::Equal {
            return Ok(secondary);
        }
        Ok(ha.cmp(&hb))
    }
}

/// Forward pointers for one lane.
///
/// The height is drawn once when the element is created and never changes,
/// even when the element is unlinked, respliced, or transferred to another
/// queue. Forward pointers are only meaningful while linked.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Tower {
    forward: Links,
    level: u8,
}

impl Tower {
    fn new(level: u8) -> Self {
        Self {
            forward: FRONT,
            level,
        }
    }
}

/// One stored (key, value) pair plus its two link towers.
#[derive(Debug, Clone)]
pub(crate) struct Element<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    towers: [Tower; 2],
}

impl<K, V> Element<K, V> {
    pub(crate) fn new(key: K, value: V, value_level: u8, key_level: u8) -> Self {
        Self {
            key,
            value,
            towers: [Tower::new(value_level), Tower::new(key_level)],
        }
    }

    #[inline]
    fn tower(&self, lane: Lane) -> &Tower {
        &self.towers[lane as usize]
    }

    #[inline]
    fn tower_mut(&mut self, lane: Lane) -> &mut Tower {
        &mut self.towers[lane as usize]
    }

    /// Successor of this element at level 0 of the given lane.
    #[inline]
    pub(crate) fn next(&self, lane: Lane) -> Handle {
        self.tower(lane).forward[0]
    }
}

/// Draws a tower height from a geometric distribution (p = 0.5) by
/// counting trailing ones in a random word.
#[inline]
pub(crate) fn random_level(rng: &mut SmallRng) -> u8 {
    let r = rng.next_u32();
    (r.trailing_ones() as usize).min(MAX_LEVEL - 1) as u8
}

/// A skip list over the shared arena, ordered per its [`Lane`].
#[derive(Debug, Clone)]
pub(crate) struct SkipIndex {
    /// `head[i]` is the first element at level i.
    head: Links,
    /// Last element at level 0, for O(1) max access.
    tail: Handle,
    /// Current maximum level in use (0-indexed).
    level: usize,
    /// Number of linked elements.
    len: usize,
    lane: Lane,
}

impl SkipIndex {
    pub(crate) const fn new(lane: Lane) -> Self {
        Self {
            head: FRONT,
            tail: Handle::NONE,
            level: 0,
            len: 0,
            lane,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// First element in lane order, or `NONE` if empty. O(1).
    #[inline]
    pub(crate) fn first(&self) -> Handle {
        self.head[0]
    }

    /// Last element in lane order, or `NONE` if empty. O(1).
    #[inline]
    pub(crate) fn last(&self) -> Handle {
        self.tail
    }

    /// Finds the predecessors of a position described by `before`.
    ///
    /// `before(handle, element)` must return `true` iff the element sorts
    /// strictly before the probed position; it must be monotone along the
    /// lane order. On success, `update[i]` holds the last element before
    /// the position at level i (`NONE` meaning the head) for every level
    /// currently in use; entries above that keep whatever the caller put
    /// there (pass [`FRONT`] so taller splices fall back to the head).
    ///
    /// Read-only: a failed comparison leaves nothing to undo.
    pub(crate) fn seek_with<K, V, F>(
        &self,
        arena: &Arena<Element<K, V>>,
        mut before: F,
        update: &mut Links,
    ) -> Result<(), OrderError>
    where
        F: FnMut(Handle, &Element<K, V>) -> Result<bool, OrderError>,
    {
        let mut current = Handle::NONE;

        for i in (0..=self.level).rev() {
            let mut next = if current.is_none() {
                self.head[i]
            } else {
                arena.get(current).expect("stale link").tower(self.lane).forward[i]
            };

            while next.is_some() {
                let node = arena.get(next).expect("stale link");
                if !before(next, node)? {
                    break;
                }
                current = next;
                next = node.tower(self.lane).forward[i];
            }

            update[i] = current;
        }

        Ok(())
    }

    /// Finds the predecessors of `target`'s position in this lane.
    ///
    /// Works whether or not `target` is currently linked: if linked, the
    /// filled `update` is exactly the predecessor set needed to
    /// [`unlink`](Self::unlink) it; if not, it is the insertion point for
    /// [`splice`](Self::splice).
    pub(crate) fn seek_element<K, V, O>(
        &self,
        arena: &Arena<Element<K, V>>,
        order: &O,
        target: Handle,
        update: &mut Links,
    ) -> Result<(), OrderError>
    where
        O: Order<K> + Order<V>,
    {
        let target_elem = arena.get(target).expect("stale handle");
        let lane = self.lane;
        self.seek_with(
            arena,
            |h, node| {
                Ok(lane.cmp_elements(order, node, h, target_elem, target)? == Ordering::Less)
            },
            update,
        )
    }

    /// Finds the first element whose key equals `key`, filling `update`
    /// with its predecessors. Key-lane only.
    ///
    /// Returns `Ok(None)` if no element holds the key. The chosen element
    /// is the head of the key group: smallest value, then smallest handle —
    /// deterministic for a given internal state.
    pub(crate) fn seek_key<K, V, O>(
        &self,
        arena: &Arena<Element<K, V>>,
        order: &O,
        key: &K,
        update: &mut Links,
    ) -> Result<Option<Handle>, OrderError>
    where
        O: Order<K> + Order<V>,
    {
        debug_assert_eq!(self.lane, Lane::ByKey);

        self.seek_with(
            arena,
            |_, node| Ok(order.try_cmp(&node.key, key)? == Ordering::Less),
            update,
        )?;

        let candidate = if update[0].is_none() {
            self.head[0]
        } else {
            arena
                .get(update[0])
                .expect("stale link")
                .tower(self.lane)
                .forward[0]
        };

        if candidate.is_none() {
            return Ok(None);
        }
        let elem = arena.get(candidate).expect("stale link");
        if order.try_cmp(&elem.key, key)? == Ordering::Equal {
            Ok(Some(candidate))
        } else {
            Ok(None)
        }
    }

    /// Links `handle` in after the predecessors recorded in `update`.
    ///
    /// Infallible: performs no comparisons. `update` must describe the
    /// element's position in the index's current state — either fresh from
    /// a seek, or recorded at the matching [`unlink`](Self::unlink) with
    /// the structure since restored to that exact state.
    pub(crate) fn splice<K, V>(
        &mut self,
        arena: &mut Arena<Element<K, V>>,
        handle: Handle,
        update: &Links,
    ) {
        let level = arena.get(handle).expect("stale handle").tower(self.lane).level as usize;

        // First pass: collect the new element's forward pointers.
        let mut new_forward = FRONT;
        for i in 0..=level {
            new_forward[i] = if update[i].is_none() {
                self.head[i]
            } else {
                arena.get(update[i]).expect("stale link").tower(self.lane).forward[i]
            };
        }

        // Second pass: write them into the element.
        {
            let tower = arena.get_mut(handle).expect("stale handle").tower_mut(self.lane);
            tower.forward[..=level].copy_from_slice(&new_forward[..=level]);
        }

        // Third pass: point predecessors (or heads) at the element.
        for i in 0..=level {
            if update[i].is_none() {
                self.head[i] = handle;
            } else {
                arena
                    .get_mut(update[i])
                    .expect("stale link")
                    .tower_mut(self.lane)
                    .forward[i] = handle;
            }
        }

        if new_forward[0].is_none() {
            self.tail = handle;
        }
        if level > self.level {
            self.level = level;
        }
        self.len += 1;
    }

    /// Unlinks `handle` given its predecessors at every level it occupies.
    ///
    /// Infallible: performs no comparisons. The element keeps its tower
    /// height and can be respliced later.
    pub(crate) fn unlink<K, V>(
        &mut self,
        arena: &mut Arena<Element<K, V>>,
        handle: Handle,
        update: &Links,
    ) {
        let (level, forward) = {
            let tower = arena.get(handle).expect("stale handle").tower(self.lane);
            (tower.level as usize, tower.forward)
        };

        for i in 0..=level {
            if update[i].is_none() {
                debug_assert_eq!(self.head[i], handle, "bad predecessor set");
                self.head[i] = forward[i];
            } else {
                let prev = arena
                    .get_mut(update[i])
                    .expect("stale link")
                    .tower_mut(self.lane);
                debug_assert_eq!(prev.forward[i], handle, "bad predecessor set");
                prev.forward[i] = forward[i];
            }
        }

        if forward[0].is_none() {
            self.tail = update[0];
        }
        while self.level > 0 && self.head[self.level].is_none() {
            self.level -= 1;
        }
        self.len -= 1;
    }
}
