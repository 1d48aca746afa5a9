//! Injected ordering strategy.
//!
//! The queue never assumes a built-in, non-failing comparison. Ordering of
//! keys and values is supplied by a strategy implementing [`Order`], whose
//! comparisons may fail. Failures abort the pending operation and the queue
//! rolls back to its prior state; see the crate docs for the exact contract.

use core::cmp::Ordering;
use core::fmt;

/// A comparison failure reported by an [`Order`] strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderError {
    reason: &'static str,
}

impl OrderError {
    /// Creates an error with a static description of why the comparison failed.
    pub const fn new(reason: &'static str) -> Self {
        Self { reason }
    }

    /// The description supplied by the strategy.
    pub const fn reason(&self) -> &'static str {
        self.reason
    }
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "comparison failed: {}", self.reason)
    }
}

impl std::error::Error for OrderError {}

/// A total order over `T` that is allowed to fail.
///
/// # Contract
///
/// - `try_cmp` must implement a strict total order: antisymmetric,
///   transitive, and consistent across calls for the same pair.
/// - A pair it has ordered successfully once must keep ordering
///   successfully: the queue relies on this when it re-locates elements it
///   already stored (extreme removal), and panics if it is violated there.
/// - Rollback paths never call the strategy, so a failure on values that
///   were never stored cannot corrupt the queue.
///
/// # Example
///
/// ```
/// use dualpq::{Order, OrderError};
/// use std::cmp::Ordering;
///
/// /// Orders f64 priorities, rejecting NaN instead of panicking.
/// struct FiniteOrder;
///
/// impl Order<f64> for FiniteOrder {
///     fn try_cmp(&self, a: &f64, b: &f64) -> Result<Ordering, OrderError> {
///         a.partial_cmp(b)
///             .ok_or(OrderError::new("NaN is not orderable"))
///     }
/// }
///
/// assert_eq!(FiniteOrder.try_cmp(&1.0, &2.0), Ok(Ordering::Less));
/// assert!(FiniteOrder.try_cmp(&1.0, &f64::NAN).is_err());
/// ```
pub trait Order<T> {
    /// Compares two values, or reports why they cannot be compared.
    fn try_cmp(&self, a: &T, b: &T) -> Result<Ordering, OrderError>;
}

/// The natural order of `T: Ord`. Never fails.
///
/// This is the default strategy: `PriorityQueue<K, V>` uses the `Ord`
/// impls of `K` and `V`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NaturalOrder;

impl<T: Ord> Order<T> for NaturalOrder {
    #[inline]
    fn try_cmp(&self, a: &T, b: &T) -> Result<Ordering, OrderError> {
        Ok(a.cmp(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_order_matches_ord() {
        assert_eq!(NaturalOrder.try_cmp(&1, &2), Ok(Ordering::Less));
        assert_eq!(NaturalOrder.try_cmp(&2, &2), Ok(Ordering::Equal));
        assert_eq!(NaturalOrder.try_cmp(&3, &2), Ok(Ordering::Greater));
    }

    #[test]
    fn order_error_carries_reason() {
        let err = OrderError::new("incomparable");
        assert_eq!(err.reason(), "incomparable");
        assert_eq!(err.to_string(), "comparison failed: incomparable");
    }
}
