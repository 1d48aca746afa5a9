//! Element arena with stable handles.
//!
//! The arena owns every element; the two index structures coordinate
//! handles into it and never own data themselves. Handles stay valid until
//! the element is explicitly removed, so an element can be unlinked from
//! one index, relinked, or moved between queues without invalidating the
//! other index's view of it.
//!
//! Free slots are reused in strict LIFO order. `merge` rollback depends on
//! this: removing elements and re-inserting them in reverse order puts each
//! one back into its original slot, so recorded neighbor handles stay
//! meaningful.

use core::fmt;

/// Stable index of an element in an [`Arena`].
///
/// `u32` with `u32::MAX` reserved as the `NONE` sentinel, so optional links
/// inside towers cost no extra space.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Handle(u32);

impl Handle {
    /// Sentinel value representing "no element".
    pub(crate) const NONE: Handle = Handle(u32::MAX);

    #[inline]
    pub(crate) fn from_usize(val: usize) -> Self {
        debug_assert!(val < u32::MAX as usize);
        Handle(val as u32)
    }

    #[inline]
    pub(crate) fn as_usize(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub(crate) fn is_some(self) -> bool {
        !self.is_none()
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Handle(NONE)")
        } else {
            write!(f, "Handle({})", self.0)
        }
    }
}

#[derive(Debug, Clone)]
enum Slot<T> {
    Occupied(T),
    Vacant,
}

/// Growable slot store with stable handles and LIFO slot reuse.
#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    /// Free-slot stack; the most recently vacated slot is reused first.
    free: Vec<Handle>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Inserts a value, returning its stable handle.
    ///
    /// # Panics
    ///
    /// Panics if the arena already holds `u32::MAX - 1` elements.
    pub(crate) fn insert(&mut self, value: T) -> Handle {
        self.len += 1;
        match self.free.pop() {
            Some(handle) => {
                let slot = &mut self.slots[handle.as_usize()];
                debug_assert!(matches!(slot, Slot::Vacant));
                *slot = Slot::Occupied(value);
                handle
            }
            None => {
                assert!(
                    self.slots.len() < u32::MAX as usize - 1,
                    "arena capacity exceeded"
                );
                let handle = Handle::from_usize(self.slots.len());
                self.slots.push(Slot::Occupied(value));
                handle
            }
        }
    }

    /// Removes and returns the value at `handle`, if occupied.
    pub(crate) fn remove(&mut self, handle: Handle) -> Option<T> {
        let slot = self.slots.get_mut(handle.as_usize())?;
        match core::mem::replace(slot, Slot::Vacant) {
            Slot::Occupied(value) => {
                self.free.push(handle);
                self.len -= 1;
                Some(value)
            }
            Slot::Vacant => None,
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> Option<&T> {
        match self.slots.get(handle.as_usize()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        match self.slots.get_mut(handle.as_usize()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}
