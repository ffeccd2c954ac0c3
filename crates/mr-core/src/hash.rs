//! Fast hash set type aliases.
//!
//! This module provides a type alias for [`FxHashSet`] from the `rustc-hash`
//! crate. The Fx hash algorithm is noticeably faster than the standard
//! library's SipHash for short keys such as file paths.
//!
//! # Why `FxHash`?
//!
//! - Keys are file paths produced by this process, never attacker-controlled
//! - Sets stay small (pending work items) and are probed on every event
//!
//! # Examples
//!
//! ```
//! use mr_core::{FxHashSet, fx_hash_set_with_capacity};
//!
//! let mut pending: FxHashSet<&str> = fx_hash_set_with_capacity(8);
//! assert!(pending.insert("src/VBox.cs"));
//! assert!(!pending.insert("src/VBox.cs"));
//! ```

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
///
/// This is faster than the standard library's `HashSet` for string keys
/// but does not provide denial-of-service resistance.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates a new [`FxHashSet`] with the specified capacity.
///
/// # Examples
///
/// ```
/// use mr_core::fx_hash_set_with_capacity;
///
/// let set: mr_core::FxHashSet<String> = fx_hash_set_with_capacity(8);
/// assert!(set.capacity() >= 8);
/// ```
#[inline]
#[must_use]
pub fn fx_hash_set_with_capacity<V>(capacity: usize) -> FxHashSet<V> {
    FxHashSet::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_hash_set_operations() {
        let mut set: FxHashSet<&str> = fx_hash_set_with_capacity(2);
        set.insert("one");
        set.insert("two");
        assert!(set.contains("one"));
        assert!(set.contains("two"));
        assert!(!set.contains("three"));
    }

    #[test]
    fn test_fx_hash_set_with_capacity() {
        let set: FxHashSet<String> = fx_hash_set_with_capacity(100);
        assert!(set.capacity() >= 100);
    }
}
