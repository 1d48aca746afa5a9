//! Error types for queue operations.
//!
//! One type per failure condition. Operations that consume caller data give
//! it back on failure, so a rejected pair is never silently dropped.

use core::fmt;

use crate::order::OrderError;

/// The queue has no elements.
///
/// Returned by the extreme accessors (`min_value`, `max_value`, `min_key`,
/// `max_key`). `delete_min`/`delete_max` do NOT report this condition;
/// draining to empty is an expected pattern and yields `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Empty;

impl fmt::Display for Empty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "priority queue is empty")
    }
}

impl std::error::Error for Empty {}

/// Insertion was aborted by a comparison failure.
///
/// Carries the rejected pair back to the caller. The queue is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertError<K, V> {
    /// The key that was not inserted.
    pub key: K,
    /// The value that was not inserted.
    pub value: V,
    /// The comparison failure that aborted the insertion.
    pub source: OrderError,
}

impl<K, V> InsertError<K, V> {
    /// Returns the rejected pair.
    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> fmt::Display for InsertError<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not insert key-value pair: {}", self.source)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> std::error::Error for InsertError<K, V> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// `change_value` failed; the queue is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeError<V> {
    /// No element with the given key exists. Carries the unconsumed value.
    NotFound(V),
    /// A comparison failed while placing the replacement value.
    Insert {
        /// The value that was not installed.
        value: V,
        /// The comparison failure.
        source: OrderError,
    },
}

impl<V> ChangeError<V> {
    /// Returns the value that was not installed.
    pub fn into_value(self) -> V {
        match self {
            ChangeError::NotFound(value) => value,
            ChangeError::Insert { value, .. } => value,
        }
    }
}

impl<V> fmt::Display for ChangeError<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeError::NotFound(_) => {
                write!(f, "no element with the specified key")
            }
            ChangeError::Insert { source, .. } => {
                write!(f, "could not install replacement value: {}", source)
            }
        }
    }
}

impl<V: fmt::Debug> std::error::Error for ChangeError<V> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChangeError::NotFound(_) => None,
            ChangeError::Insert { source, .. } => Some(source),
        }
    }
}

/// `merge` was aborted by a comparison failure.
///
/// Raised only after both queues have been restored to their pre-call
/// states: the receiver's partial insertions are undone and every
/// transferred element is back in the source at its original position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeError {
    /// The comparison failure that aborted the merge.
    pub source: OrderError,
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "merge aborted, both queues restored: {}", self.source)
    }
}

impl std::error::Error for MergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
