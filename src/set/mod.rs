//! Mutable hash sets behind one capability interface.
//!
//! This module provides two interchangeable implementations of [`MapSet`]:
//!
//! - [`UnsafeSet`]: a plain hash set with no internal synchronization
//! - [`SafeSet`]: an [`UnsafeSet`] guarded by a reader/writer lock, safe to
//!   share between threads
//!
//! `SafeSet` composes an `UnsafeSet` by delegation: every operation takes the
//! lock in the appropriate mode, forwards to the inner set, and releases the
//! lock before returning.
//!
//! # Examples
//!
//! ```rust
//! use mapset::{MapSet, SafeSet, UnsafeSet};
//!
//! fn fill<S: MapSet<i32>>(set: &mut S) {
//!     for element in [3, 1, 2, 3] {
//!         set.add(element);
//!     }
//! }
//!
//! let mut plain = UnsafeSet::new();
//! let mut locked = SafeSet::new();
//! fill(&mut plain);
//! fill(&mut locked);
//!
//! assert_eq!(MapSet::len(&plain), 3);
//! assert_eq!(MapSet::len(&locked), 3);
//! ```
//!
//! # Construction
//!
//! ```rust
//! use mapset::{map_set, set_from, unsafe_set_from};
//!
//! let safe = set_from(["a", "b", "a"]);
//! assert_eq!(safe.len(), 2);
//!
//! let plain = unsafe_set_from(vec![1, 2, 2, 3]);
//! assert_eq!(plain.len(), 3);
//!
//! let literal = map_set![1, 2, 3];
//! assert!(literal.contains_all(&[1, 2, 3]));
//! ```

use std::fmt;
use std::hash::Hash;

mod lock;
mod safe_set;
mod unsafe_set;

pub use safe_set::SafeSet;
pub use unsafe_set::IntoIter;
pub use unsafe_set::Iter;
pub use unsafe_set::UnsafeSet;

/// The capability interface shared by [`UnsafeSet`] and [`SafeSet`].
///
/// Enumeration order is never part of the contract: `each`, `to_vec`,
/// `join`, `pop` and `random_element` observe members in whatever order the
/// backing hash map yields them.
///
/// Methods that mention `Self` by value (`equal`, `clone_set`) are only
/// available on sized implementors; the rest of the interface can be used
/// through `dyn MapSet<T>`.
///
/// Mutating methods take `&mut self`, so generic code over this trait needs
/// exclusive access. To mutate one set from several threads, share it as
/// `Arc<SafeSet<T>>` and call [`SafeSet`]'s inherent methods, which take
/// `&self`:
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
///
/// use mapset::SafeSet;
///
/// let set = Arc::new(SafeSet::new());
/// let handles: Vec<_> = (0..4)
///     .map(|element| {
///         let set = Arc::clone(&set);
///         thread::spawn(move || set.add(element))
///     })
///     .collect();
/// for handle in handles {
///     assert!(handle.join().unwrap());
/// }
/// assert_eq!(set.len(), 4);
/// ```
pub trait MapSet<T> {
    /// Inserts `element`; returns `true` if it was not already a member.
    fn add(&mut self, element: T) -> bool;

    /// Returns `true` if every element of `elements` is a member.
    ///
    /// An empty slice returns `true`.
    fn contains_all(&self, elements: &[T]) -> bool;

    /// Returns `true` if `element` is a member.
    fn contains(&self, element: &T) -> bool {
        self.contains_all(std::slice::from_ref(element))
    }

    /// Removes `element`; returns `true` if it was a member. Removing a
    /// non-member leaves the set unchanged.
    fn remove(&mut self, element: &T) -> bool;

    /// Returns the cardinality.
    fn len(&self) -> usize;

    /// Returns `true` if the cardinality is zero.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every member.
    fn clear(&mut self);

    /// Visits each member once; stops early when `visit` returns `true`.
    fn each(&self, visit: &mut dyn FnMut(&T) -> bool);

    /// Removes and returns an arbitrary member, or `None` when empty.
    fn pop(&mut self) -> Option<T>;

    /// Returns some member without removing it, or `None` when empty.
    fn random_element(&self) -> Option<T>;

    /// Copies every member into a vector.
    fn to_vec(&self) -> Vec<T>;

    /// Renders the set as `Set{e1<separator>e2...}`.
    fn join(&self, separator: &str) -> String
    where
        T: fmt::Display;

    /// Returns `true` if both sets hold exactly the same members.
    fn equal(&self, other: &Self) -> bool
    where
        Self: Sized;

    /// Returns an independent copy of the set.
    fn clone_set(&self) -> Self
    where
        Self: Sized;
}

// =============================================================================
// Construction Helpers
// =============================================================================

/// Creates an empty thread-safe set.
#[inline]
#[must_use]
pub fn new_set<T>() -> SafeSet<T> {
    SafeSet::new()
}

/// Creates a thread-safe set holding the distinct elements of `elements`.
///
/// # Examples
///
/// ```rust
/// use mapset::set_from;
///
/// let set = set_from(vec![7, 5, 3, 7]);
/// assert_eq!(set.len(), 3);
/// ```
#[must_use]
pub fn set_from<T, I>(elements: I) -> SafeSet<T>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    elements.into_iter().collect()
}

/// Creates an empty single-threaded set.
#[inline]
#[must_use]
pub fn new_unsafe_set<T>() -> UnsafeSet<T> {
    UnsafeSet::new()
}

/// Creates a single-threaded set holding the distinct elements of
/// `elements`.
#[must_use]
pub fn unsafe_set_from<T, I>(elements: I) -> UnsafeSet<T>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    elements.into_iter().collect()
}

/// Creates a [`SafeSet`] containing the given elements.
///
/// # Examples
///
/// ```rust
/// use mapset::map_set;
///
/// let set = map_set!["a", "b", "a"];
/// assert_eq!(set.len(), 2);
///
/// let empty: mapset::SafeSet<i32> = map_set![];
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! map_set {
    () => {
        $crate::SafeSet::new()
    };
    ($($element:expr),+ $(,)?) => {
        $crate::set_from([$($element),+])
    };
}

/// Creates an [`UnsafeSet`] containing the given elements.
///
/// # Examples
///
/// ```rust
/// use mapset::unsafe_set;
///
/// let set = unsafe_set![1, 2, 3];
/// assert_eq!(set.len(), 3);
/// ```
#[macro_export]
macro_rules! unsafe_set {
    () => {
        $crate::UnsafeSet::new()
    };
    ($($element:expr),+ $(,)?) => {
        $crate::unsafe_set_from([$($element),+])
    };
}

// =============================================================================
// Hasher Aliases
// =============================================================================

/// [`UnsafeSet`] using the `FxHash` algorithm from `rustc-hash`.
#[cfg(feature = "fxhash")]
pub type FxUnsafeSet<T> = UnsafeSet<T, rustc_hash::FxBuildHasher>;

/// [`SafeSet`] using the `FxHash` algorithm from `rustc-hash`.
#[cfg(feature = "fxhash")]
pub type FxSafeSet<T> = SafeSet<T, rustc_hash::FxBuildHasher>;

/// [`UnsafeSet`] using `ahash`.
#[cfg(feature = "ahash")]
pub type AUnsafeSet<T> = UnsafeSet<T, ahash::RandomState>;

/// [`SafeSet`] using `ahash`.
#[cfg(feature = "ahash")]
pub type ASafeSet<T> = SafeSet<T, ahash::RandomState>;
