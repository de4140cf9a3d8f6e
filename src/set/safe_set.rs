//! Thread-safe hash set guarded by a reader/writer lock.
//!
//! [`SafeSet`] owns exactly one [`UnsafeSet`] and one reader/writer lock with
//! the same lifetime. The inner set is only reachable while the lock is held:
//!
//! - pure reads (`contains`, `len`, `each`, `equal`, `join`, `to_vec`,
//!   `clone_set`) take the lock in shared mode, so readers run concurrently
//! - mutations (`add`, `remove`, `clear`, `pop`) take it in exclusive mode
//! - `random_element` also takes the exclusive lock even though it does not
//!   mutate, which serializes it with writers rather than with readers
//!
//! Locks are blocking with no timeout, and each one is released before the
//! method returns. No I/O is performed while a lock is held.
//!
//! # Examples
//!
//! ```rust
//! use mapset::SafeSet;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let set = Arc::new(SafeSet::new());
//!
//! let handles: Vec<_> = (0..8)
//!     .map(|index| {
//!         let set = Arc::clone(&set);
//!         thread::spawn(move || set.add(index))
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     assert!(handle.join().unwrap());
//! }
//! assert_eq!(set.len(), 8);
//! ```

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::FromIterator;

use super::lock::RwLock;
use super::{MapSet, UnsafeSet};

/// An [`UnsafeSet`] behind a reader/writer lock.
///
/// Every method takes `&self`; share the set between threads with
/// [`Arc`](std::sync::Arc). `SafeSet<T>` is `Send + Sync` whenever `T` is.
///
/// Composite sequences of calls (for example `contains` followed by `add`)
/// are not atomic with respect to other threads. Only each individual call
/// runs under a single lock acquisition.
pub struct SafeSet<T, S = RandomState> {
    inner: RwLock<UnsafeSet<T, S>>,
}

static_assertions::assert_impl_all!(SafeSet<i32>: Send, Sync);
static_assertions::assert_impl_all!(SafeSet<String>: Send, Sync);

impl<T> SafeSet<T, RandomState> {
    /// Creates an empty set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapset::SafeSet;
    ///
    /// let set: SafeSet<i32> = SafeSet::new();
    /// assert_eq!(set.len(), 0);
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from_inner(UnsafeSet::new())
    }

    /// Creates an empty set with room for at least `capacity` elements.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_inner(UnsafeSet::with_capacity(capacity))
    }
}

impl<T, S> SafeSet<T, S> {
    /// Creates an empty set which will use `hasher` to hash its elements.
    #[inline]
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self::from_inner(UnsafeSet::with_hasher(hasher))
    }

    #[inline]
    fn from_inner(inner: UnsafeSet<T, S>) -> Self {
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Consumes the lock and returns the wrapped set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapset::{SafeSet, UnsafeSet};
    ///
    /// let set: SafeSet<_> = [1, 2].into_iter().collect();
    /// let inner: UnsafeSet<_> = set.into_inner();
    /// assert_eq!(inner.len(), 2);
    /// ```
    #[must_use]
    pub fn into_inner(self) -> UnsafeSet<T, S> {
        self.inner.into_inner()
    }

    /// Returns the cardinality. Takes the read lock.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if the set has no members. Takes the read lock.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Removes every member. Takes the write lock.
    ///
    /// The set keeps its identity: other holders of the same `SafeSet`
    /// observe the empty state.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Visits every member once under the read lock; stops as soon as
    /// `visit` returns `true`.
    ///
    /// The lock is held for the whole traversal. `visit` must not call back
    /// into the same set: write-locking methods deadlock outright, and a
    /// nested read can block behind a queued writer.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapset::SafeSet;
    ///
    /// let source: SafeSet<_> = ["Z", "Y", "X", "W"].into_iter().collect();
    /// let copy = SafeSet::new();
    /// source.each(|element| {
    ///     copy.add(*element);
    ///     false
    /// });
    /// assert!(source.equal(&copy));
    /// ```
    pub fn each<F>(&self, visit: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.inner.read().each(visit);
    }

    /// Runs `read` with shared access to the inner set.
    ///
    /// The read lock is held while `read` runs, so the closure observes one
    /// consistent snapshot.
    pub fn with_read<R>(&self, read: impl FnOnce(&UnsafeSet<T, S>) -> R) -> R {
        let guard = self.inner.read();
        read(&guard)
    }
}

impl<T, S> SafeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    /// Inserts `element` under the write lock; returns `true` if it was not
    /// already a member.
    pub fn add(&self, element: T) -> bool {
        self.inner.write().add(element)
    }

    /// Returns `true` if `element` is a member. Takes the read lock.
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().contains(element)
    }

    /// Returns `true` if every given element is a member.
    ///
    /// All elements are checked under one read-lock acquisition. An empty
    /// slice returns `true`.
    #[must_use]
    pub fn contains_all<Q>(&self, elements: &[Q]) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.inner.read().contains_all(elements)
    }

    /// Removes `element` under the write lock; returns `true` if it was a
    /// member.
    pub fn remove<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().remove(element)
    }

    /// Returns `true` if both sets hold exactly the same members.
    ///
    /// # Lock order
    ///
    /// The read lock of `self` is taken first, then the read lock of `other`;
    /// both are held during the comparison. Two threads running
    /// `a.equal(&b)` and `b.equal(&a)` acquire the same pair of locks in
    /// opposite orders. That is only deadlock-free because both acquisitions
    /// are shared reads; switching this lock to an exclusive-only mutex would
    /// need a global ordering here.
    ///
    /// The lock is writer-fair, so a plain read queues behind a waiting
    /// writer. The second acquisition is recursive (it joins existing
    /// readers without waiting), otherwise the opposite-order scenario above
    /// deadlocks as soon as writers are queued on both sets.
    ///
    /// Comparing a set with itself returns `true` without a second
    /// acquisition, as recursive read locking can block behind a queued
    /// writer.
    #[must_use]
    pub fn equal<S2>(&self, other: &SafeSet<T, S2>) -> bool
    where
        S2: BuildHasher,
    {
        if std::ptr::addr_eq(std::ptr::from_ref(self), std::ptr::from_ref(other)) {
            return true;
        }
        let this = self.inner.read();
        let that = other.inner.read_recursive();
        this.equal(&*that)
    }

    /// Inserts every element of `elements` under one write-lock acquisition
    /// and returns how many were newly inserted.
    pub fn add_all<I>(&self, elements: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let mut inner = self.inner.write();
        elements
            .into_iter()
            .map(|element| usize::from(inner.add(element)))
            .sum()
    }
}

impl<T, S> SafeSet<T, S>
where
    T: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Removes and returns an arbitrary member under the write lock, or
    /// `None` if the set is empty.
    pub fn pop(&self) -> Option<T> {
        self.inner.write().pop()
    }

    /// Returns a copy of some member, or `None` if the set is empty.
    ///
    /// Takes the write lock although the set is not modified, so the call is
    /// serialized with writers and excluded from concurrent readers.
    pub fn random_element(&self) -> Option<T> {
        self.inner.write().random_element()
    }

    /// Copies every member into a vector.
    ///
    /// Cardinality and copy are taken under one read-lock acquisition, so the
    /// result is a consistent snapshot whose length equals the cardinality at
    /// that instant.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.read().to_vec()
    }
}

impl<T, S> SafeSet<T, S>
where
    T: Clone,
    S: Clone,
{
    /// Returns an independent copy with its own lock.
    ///
    /// The inner set is deep-copied under `self`'s read lock; the copy starts
    /// unlocked and shares nothing with the original.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapset::SafeSet;
    ///
    /// let original: SafeSet<_> = [1, 2].into_iter().collect();
    /// let copy = original.clone_set();
    /// copy.remove(&1);
    ///
    /// assert_eq!(original.len(), 2);
    /// assert_eq!(copy.len(), 1);
    /// ```
    #[must_use]
    pub fn clone_set(&self) -> Self {
        let snapshot = self.inner.read().clone();
        log::trace!("cloned SafeSet with {} members", snapshot.len());
        Self::from_inner(snapshot)
    }
}

impl<T: fmt::Display, S> SafeSet<T, S> {
    /// Renders the set as `Set{e1<separator>e2...}` under the read lock.
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        self.inner.read().join(separator)
    }
}

// =============================================================================
// MapSet Implementation
// =============================================================================

impl<T, S> MapSet<T> for SafeSet<T, S>
where
    T: Eq + Hash + Clone,
    S: BuildHasher + Clone,
{
    fn add(&mut self, element: T) -> bool {
        SafeSet::add(self, element)
    }

    fn contains_all(&self, elements: &[T]) -> bool {
        SafeSet::contains_all(self, elements)
    }

    fn remove(&mut self, element: &T) -> bool {
        SafeSet::remove(self, element)
    }

    fn len(&self) -> usize {
        SafeSet::len(self)
    }

    fn clear(&mut self) {
        SafeSet::clear(self);
    }

    fn each(&self, visit: &mut dyn FnMut(&T) -> bool) {
        SafeSet::each(self, visit);
    }

    fn pop(&mut self) -> Option<T> {
        SafeSet::pop(self)
    }

    fn random_element(&self) -> Option<T> {
        SafeSet::random_element(self)
    }

    fn to_vec(&self) -> Vec<T> {
        SafeSet::to_vec(self)
    }

    fn join(&self, separator: &str) -> String
    where
        T: fmt::Display,
    {
        SafeSet::join(self, separator)
    }

    fn equal(&self, other: &Self) -> bool {
        SafeSet::equal(self, other)
    }

    fn clone_set(&self) -> Self {
        SafeSet::clone_set(self)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T, S: Default> Default for SafeSet<T, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T: Clone, S: Clone> Clone for SafeSet<T, S> {
    fn clone(&self) -> Self {
        self.clone_set()
    }
}

impl<T, S> From<UnsafeSet<T, S>> for SafeSet<T, S> {
    fn from(inner: UnsafeSet<T, S>) -> Self {
        Self::from_inner(inner)
    }
}

impl<T, const N: usize> From<[T; N]> for SafeSet<T, RandomState>
where
    T: Eq + Hash,
{
    fn from(elements: [T; N]) -> Self {
        Self::from_inner(UnsafeSet::from(elements))
    }
}

impl<T> From<Vec<T>> for SafeSet<T, RandomState>
where
    T: Eq + Hash,
{
    fn from(elements: Vec<T>) -> Self {
        Self::from_inner(UnsafeSet::from(elements))
    }
}

impl<T, S> FromIterator<T> for SafeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_inner(iter.into_iter().collect())
    }
}

impl<T, S> Extend<T> for SafeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<T, S> IntoIterator for SafeSet<T, S> {
    type Item = T;
    type IntoIter = super::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_inner().into_iter()
    }
}

impl<T, S> PartialEq for SafeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl<T, S> Eq for SafeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
}

impl<T: fmt::Debug, S> fmt::Debug for SafeSet<T, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner.read(), formatter)
    }
}

impl<T: fmt::Display, S> fmt::Display for SafeSet<T, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner.read(), formatter)
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize, S> serde::Serialize for SafeSet<T, S> {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: serde::Serializer,
    {
        serde::Serialize::serialize(&*self.inner.read(), serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T, S> serde::Deserialize<'de> for SafeSet<T, S>
where
    T: serde::Deserialize<'de> + Eq + Hash,
    S: BuildHasher + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        <UnsafeSet<T, S> as serde::Deserialize<'de>>::deserialize(deserializer)
            .map(Self::from_inner)
    }
}

// =============================================================================
// Tests
// =============================================================================
