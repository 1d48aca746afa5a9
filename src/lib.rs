//! # dualpq
//!
//! An associative priority queue: elements are (key, value) pairs, ordered
//! by value for min/max access and indexed by key for lookup and in-place
//! value replacement. Duplicate keys, duplicate values, and fully duplicate
//! pairs are all stored as distinct elements.
//!
//! ## Design
//!
//! One arena owns the elements; two skip-list indices view it, each
//! embedding its forward pointers inside the elements themselves:
//!
//! ```text
//!              ┌───────────────────────────────┐
//!   by_value ──►  Element { key, value,        ◄── by_key
//!   (value,key)│            tower[0], tower[1] }│  (key,value)
//!              └───────────────────────────────┘
//!                           Arena
//! ```
//!
//! The value index gives O(1) access to the extremes and O(log n) expected
//! removal; the key index gives O(log n) expected lookup for
//! [`change_value`](PriorityQueue::change_value). Handles into the arena
//! are stable, so unlinking an element from one index never disturbs the
//! other's view of it, and [`merge`](PriorityQueue::merge) moves elements
//! between queues without cloning keys or values.
//!
//! ## Failure semantics
//!
//! Comparisons come from an injected [`Order`] strategy and are allowed to
//! fail. Every operation provides the strong guarantee: if it reports an
//! error, both the queue (and, for `merge`, the source queue too) are
//! observably unchanged, and consumed arguments ride back inside the error.
//! This works because mutations are split into a read-only search phase,
//! where all comparisons happen, and a comparison-free structural phase
//! that cannot fail.
//!
//! ## Example
//!
//! ```
//! use dualpq::PriorityQueue;
//!
//! let mut tasks: PriorityQueue<&str, u32> = PriorityQueue::new();
//! tasks.insert("compile", 3).unwrap();
//! tasks.insert("link", 5).unwrap();
//! tasks.insert("test", 1).unwrap();
//!
//! assert_eq!(tasks.min_key(), Ok(&"test"));
//!
//! // Reprioritize in place.
//! tasks.change_value(&"link", 0).unwrap();
//! assert_eq!(tasks.delete_min(), Some(("link", 0)));
//! assert_eq!(tasks.delete_min(), Some(("test", 1)));
//! ```

pub mod error;
pub mod order;

mod arena;
mod index;
mod queue;

pub use error::{ChangeError, Empty, InsertError, MergeError};
pub use order::{NaturalOrder, Order, OrderError};
pub use queue::PriorityQueue;
