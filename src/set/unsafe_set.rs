//! Single-threaded hash set.
//!
//! [`UnsafeSet`] stores its members as the keys of a `HashMap<T, ()>`; the
//! unit value is a presence marker and carries no information. The map's key
//! set *is* the set membership and the map length is the cardinality.
//!
//! "Unsafe" refers to thread safety only: the type performs no internal
//! synchronization. Rust's borrow rules still prevent unsynchronized shared
//! mutation, so sharing one across threads requires an external lock, or the
//! [`SafeSet`](super::SafeSet) wrapper.
//!
//! # Examples
//!
//! ```rust
//! use mapset::UnsafeSet;
//!
//! let mut set = UnsafeSet::new();
//! assert!(set.add(1));
//! assert!(set.add(2));
//! assert!(!set.add(1)); // already a member
//!
//! assert_eq!(set.len(), 2);
//! assert!(set.contains_all(&[1, 2]));
//! assert!(!set.contains(&3));
//! ```

use std::borrow::Borrow;
use std::collections::HashMap;
use std::collections::hash_map::{self, RandomState};
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::FromIterator;

use super::MapSet;

/// An unordered set of unique elements with no internal locking.
///
/// Iteration order is an artifact of the hash map and is not stable across
/// calls, instances or hashers.
///
/// # Time Complexity
///
/// | Operation        | Complexity |
/// |------------------|------------|
/// | `add`            | O(1)*      |
/// | `contains`       | O(1)*      |
/// | `remove`         | O(1)*      |
/// | `len`            | O(1)       |
/// | `pop`            | O(1)*      |
/// | `equal`          | O(n)       |
/// | `to_vec`, `each` | O(n)       |
///
/// \* expected, amortized
#[derive(Clone)]
pub struct UnsafeSet<T, S = RandomState> {
    elements: HashMap<T, (), S>,
    /// Keys collected by one front-to-back scan, handed out by `pop`.
    /// Entries may be stale; `pop` skips any that are no longer members.
    pop_queue: Vec<T>,
}

/// Each refill of the pop queue takes this fraction of the current members.
const POP_BATCH_DIVISOR: usize = 8;

impl<T> UnsafeSet<T, RandomState> {
    /// Creates an empty set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapset::UnsafeSet;
    ///
    /// let set: UnsafeSet<i32> = UnsafeSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            elements: HashMap::new(),
            pop_queue: Vec::new(),
        }
    }

    /// Creates an empty set with room for at least `capacity` elements.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: HashMap::with_capacity(capacity),
            pop_queue: Vec::new(),
        }
    }
}

impl<T, S> UnsafeSet<T, S> {
    /// Creates an empty set which will use `hasher` to hash its elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapset::UnsafeSet;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let mut set = UnsafeSet::with_hasher(RandomState::new());
    /// set.add("a");
    /// assert_eq!(set.len(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub const fn with_hasher(hasher: S) -> Self {
        Self {
            elements: HashMap::with_hasher(hasher),
            pop_queue: Vec::new(),
        }
    }

    /// Creates an empty set with the given capacity and hasher.
    #[inline]
    #[must_use]
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            elements: HashMap::with_capacity_and_hasher(capacity, hasher),
            pop_queue: Vec::new(),
        }
    }

    /// Returns the cardinality of the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapset::UnsafeSet;
    ///
    /// let set: UnsafeSet<_> = [7, 5, 3, 7].into_iter().collect();
    /// assert_eq!(set.len(), 3);
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the set has no members.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Removes every member. The set keeps its allocation and hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapset::UnsafeSet;
    ///
    /// let mut set: UnsafeSet<_> = [2, 5, 9, 10].into_iter().collect();
    /// set.clear();
    /// assert_eq!(set.len(), 0);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.elements.clear();
        self.pop_queue.clear();
    }

    /// Returns the number of members the set can hold without reallocating.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.elements.capacity()
    }

    /// Returns an iterator over the members in unspecified order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.elements.keys(),
        }
    }

    /// Visits every member once, in unspecified order.
    ///
    /// Traversal stops as soon as `visit` returns `true`; the remaining
    /// members are not visited.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapset::UnsafeSet;
    ///
    /// let set: UnsafeSet<_> = ["W", "X", "Y", "Z"].into_iter().collect();
    ///
    /// let mut visited = 0;
    /// set.each(|_| {
    ///     visited += 1;
    ///     visited == 2
    /// });
    /// assert_eq!(visited, 2);
    /// ```
    pub fn each<F>(&self, mut visit: F)
    where
        F: FnMut(&T) -> bool,
    {
        for element in self.elements.keys() {
            if visit(element) {
                break;
            }
        }
    }

    /// Returns a reference to the hasher.
    #[inline]
    pub fn hasher(&self) -> &S {
        self.elements.hasher()
    }
}

impl<T, S> UnsafeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    /// Inserts `element` if it is not already a member.
    ///
    /// Returns `true` if the element was newly inserted and `false` if it was
    /// already present, in which case the set is left untouched (the stored
    /// value is not replaced).
    #[inline]
    pub fn add(&mut self, element: T) -> bool {
        match self.elements.entry(element) {
            hash_map::Entry::Occupied(_) => false,
            hash_map::Entry::Vacant(vacant) => {
                vacant.insert(());
                true
            }
        }
    }

    /// Returns `true` if `element` is a member.
    ///
    /// The element may be any borrowed form of the set's element type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapset::UnsafeSet;
    ///
    /// let set: UnsafeSet<String> = ["a".to_string()].into_iter().collect();
    /// assert!(set.contains("a"));
    /// ```
    #[inline]
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.elements.contains_key(element)
    }

    /// Returns `true` if every given element is a member.
    ///
    /// An empty argument list is vacuously contained.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapset::UnsafeSet;
    ///
    /// let set: UnsafeSet<_> = [8, 6, 7, 5, 3, 0, 9].into_iter().collect();
    /// assert!(set.contains_all(&[8, 6, 7, 5, 3, 0, 9]));
    /// assert!(!set.contains_all(&[8, 6, 11]));
    /// assert!(set.contains_all(&[]));
    /// ```
    #[must_use]
    pub fn contains_all<Q>(&self, elements: &[Q]) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        elements
            .iter()
            .all(|element| self.elements.contains_key(element))
    }

    /// Removes `element` from the set.
    ///
    /// Returns `true` if it was a member. Removing a non-member is a no-op.
    #[inline]
    pub fn remove<Q>(&mut self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.elements.remove(element).is_some()
    }

    /// Returns `true` if both sets hold exactly the same members.
    ///
    /// Insertion order and hasher state play no part in the comparison.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapset::UnsafeSet;
    ///
    /// let a: UnsafeSet<_> = [1, 2, 3].into_iter().collect();
    /// let b: UnsafeSet<_> = [3, 1, 2].into_iter().collect();
    /// assert!(a.equal(&b));
    /// ```
    #[must_use]
    pub fn equal<S2>(&self, other: &UnsafeSet<T, S2>) -> bool
    where
        S2: BuildHasher,
    {
        self.len() == other.len() && self.iter().all(|element| other.contains(element))
    }

    /// Keeps only the members for which `keep` returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.elements.retain(|element, ()| keep(element));
    }
}

impl<T, S> UnsafeSet<T, S>
where
    T: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Removes and returns an arbitrary member, or `None` if the set is
    /// empty.
    ///
    /// Repeated calls drain every member exactly once. Draining releases
    /// spare capacity as the set shrinks.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapset::UnsafeSet;
    ///
    /// let mut set: UnsafeSet<_> = ["a", "b"].into_iter().collect();
    /// let mut popped = vec![set.pop().unwrap(), set.pop().unwrap()];
    /// popped.sort_unstable();
    /// assert_eq!(popped, vec!["a", "b"]);
    /// assert_eq!(set.pop(), None);
    /// ```
    pub fn pop(&mut self) -> Option<T> {
        loop {
            while let Some(key) = self.pop_queue.pop() {
                if let Some((element, ())) = self.elements.remove_entry(&key) {
                    self.release_spare_capacity();
                    return Some(element);
                }
            }
            if self.elements.is_empty() {
                return None;
            }
            // Iteration always starts at the front of the table, which pops
            // leave empty, so one scan collects a whole batch.
            let batch = (self.elements.len() / POP_BATCH_DIVISOR).max(1);
            self.pop_queue.extend(self.elements.keys().take(batch).cloned());
        }
    }

    fn release_spare_capacity(&mut self) {
        if self.elements.capacity() > 4 * self.elements.len() + 16 {
            self.elements.shrink_to_fit();
            self.pop_queue.shrink_to_fit();
        }
    }

    /// Returns a copy of some member without removing it, or `None` if the
    /// set is empty.
    ///
    /// The choice follows the map's iteration order; it is not a uniform
    /// random sample.
    #[must_use]
    pub fn random_element(&self) -> Option<T> {
        self.elements.keys().next().cloned()
    }

    /// Copies every member into a vector, in unspecified order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapset::UnsafeSet;
    ///
    /// let set: UnsafeSet<_> = [1, 2, 3].into_iter().collect();
    /// let mut elements = set.to_vec();
    /// elements.sort_unstable();
    /// assert_eq!(elements, vec![1, 2, 3]);
    /// ```
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.elements.keys().cloned().collect()
    }
}

impl<T: fmt::Display, S> UnsafeSet<T, S> {
    /// Renders the set as `Set{e1<separator>e2...}` using each member's
    /// `Display` form. Member order is unspecified.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapset::UnsafeSet;
    ///
    /// let set: UnsafeSet<_> = [42].into_iter().collect();
    /// assert_eq!(set.join(","), "Set{42}");
    ///
    /// let empty: UnsafeSet<i32> = UnsafeSet::new();
    /// assert_eq!(empty.join(","), "Set{}");
    /// ```
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        let mut rendered = String::from("Set{");
        for (index, element) in self.elements.keys().enumerate() {
            if index > 0 {
                rendered.push_str(separator);
            }
            rendered.push_str(&element.to_string());
        }
        rendered.push('}');
        rendered
    }
}

// =============================================================================
// MapSet Implementation
// =============================================================================

impl<T, S> MapSet<T> for UnsafeSet<T, S>
where
    T: Eq + Hash + Clone,
    S: BuildHasher + Clone,
{
    #[inline]
    fn add(&mut self, element: T) -> bool {
        Self::add(self, element)
    }

    #[inline]
    fn contains_all(&self, elements: &[T]) -> bool {
        Self::contains_all(self, elements)
    }

    #[inline]
    fn remove(&mut self, element: &T) -> bool {
        Self::remove(self, element)
    }

    #[inline]
    fn len(&self) -> usize {
        Self::len(self)
    }

    #[inline]
    fn clear(&mut self) {
        Self::clear(self);
    }

    fn each(&self, visit: &mut dyn FnMut(&T) -> bool) {
        Self::each(self, visit);
    }

    fn pop(&mut self) -> Option<T> {
        Self::pop(self)
    }

    fn random_element(&self) -> Option<T> {
        Self::random_element(self)
    }

    fn to_vec(&self) -> Vec<T> {
        Self::to_vec(self)
    }

    fn join(&self, separator: &str) -> String
    where
        T: fmt::Display,
    {
        Self::join(self, separator)
    }

    fn equal(&self, other: &Self) -> bool {
        Self::equal(self, other)
    }

    fn clone_set(&self) -> Self {
        self.clone()
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Borrowing iterator over the members of an [`UnsafeSet`].
pub struct Iter<'a, T> {
    inner: hash_map::Keys<'a, T, ()>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Owning iterator over the members of an [`UnsafeSet`].
pub struct IntoIter<T> {
    inner: hash_map::IntoKeys<T, ()>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T, S> IntoIterator for UnsafeSet<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.elements.into_keys(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a UnsafeSet<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T, S: Default> Default for UnsafeSet<T, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T, S> FromIterator<T> for UnsafeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T, S> Extend<T> for UnsafeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.add(element);
        }
    }
}

impl<T, const N: usize> From<[T; N]> for UnsafeSet<T, RandomState>
where
    T: Eq + Hash,
{
    fn from(elements: [T; N]) -> Self {
        elements.into_iter().collect()
    }
}

impl<T> From<Vec<T>> for UnsafeSet<T, RandomState>
where
    T: Eq + Hash,
{
    fn from(elements: Vec<T>) -> Self {
        elements.into_iter().collect()
    }
}

impl<T, S> PartialEq for UnsafeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl<T, S> Eq for UnsafeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
}

impl<T: fmt::Debug, S> fmt::Debug for UnsafeSet<T, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display, S> fmt::Display for UnsafeSet<T, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.join(", "))
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize, S> serde::Serialize for UnsafeSet<T, S> {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
struct UnsafeSetVisitor<T, S> {
    marker: std::marker::PhantomData<(T, S)>,
}

#[cfg(feature = "serde")]
impl<'de, T, S> serde::de::Visitor<'de> for UnsafeSetVisitor<T, S>
where
    T: serde::Deserialize<'de> + Eq + Hash,
    S: BuildHasher + Default,
{
    type Value = UnsafeSet<T, S>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut set = UnsafeSet::with_capacity_and_hasher(
            seq.size_hint().unwrap_or(0).min(4096),
            S::default(),
        );
        while let Some(element) = seq.next_element()? {
            set.add(element);
        }
        Ok(set)
    }
}

#[cfg(feature = "serde")]
impl<'de, T, S> serde::Deserialize<'de> for UnsafeSet<T, S>
where
    T: serde::Deserialize<'de> + Eq + Hash,
    S: BuildHasher + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(UnsafeSetVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn make_set(elements: &[i32]) -> UnsafeSet<i32> {
        elements.iter().copied().collect()
    }

    #[rstest]
    fn test_new_set_is_empty() {
        let set: UnsafeSet<i32> = UnsafeSet::new();
        assert_eq!(set.len(), 0);
        assert!(set.is_empty());
    }

    #[rstest]
    fn test_add_duplicate_returns_false_and_keeps_cardinality() {
        let mut set = make_set(&[1]);
        assert!(!set.add(1));
        assert_eq!(set.len(), 1);
    }

    #[rstest]
    #[case(&[1, 2, 3], 3)]
    #[case(&[7, 5, 3, 7], 3)]
    #[case(&[4, 4, 4, 4], 1)]
    #[case(&[], 0)]
    fn test_cardinality_counts_distinct_elements(#[case] elements: &[i32], #[case] expected: usize) {
        assert_eq!(make_set(elements).len(), expected);
    }

    #[rstest]
    fn test_remove_member_and_non_member() {
        let mut set = make_set(&[6, 3, 1]);
        assert!(set.remove(&3));
        assert!(!set.remove(&3));
        assert_eq!(set.len(), 2);
        assert!(set.contains_all(&[6, 1]));
    }

    #[rstest]
    #[case(1_000)]
    #[case(200_000)]
    fn test_pop_drains_large_set_and_releases_capacity(#[case] size: i32) {
        let mut set: UnsafeSet<i32> = (0..size).collect();

        let mut drained = Vec::with_capacity(set.len());
        while let Some(element) = set.pop() {
            drained.push(element);
        }

        drained.sort_unstable();
        assert_eq!(drained, (0..size).collect::<Vec<_>>());
        assert!(set.capacity() <= 32);
    }

    #[rstest]
    fn test_pop_skips_members_removed_after_the_batch_was_taken() {
        let mut set = make_set(&(0..64).collect::<Vec<_>>());
        let first = set.pop().unwrap();

        // drop every remaining member, then bring one back
        for element in 0..64 {
            set.remove(&element);
        }
        assert!(set.add(first + 1000));

        assert_eq!(set.pop(), Some(first + 1000));
        assert_eq!(set.pop(), None);
    }

    #[rstest]
    fn test_pop_returns_member_re_added_after_removal() {
        let mut set = make_set(&(0..32).collect::<Vec<_>>());
        let first = set.pop().unwrap();
        let mut remaining: Vec<i32> = set.iter().copied().collect();
        for element in &remaining {
            set.remove(element);
            set.add(*element);
        }

        let mut drained = Vec::new();
        while let Some(element) = set.pop() {
            drained.push(element);
        }
        drained.sort_unstable();
        remaining.sort_unstable();
        assert_eq!(drained, remaining);
        assert!(!drained.contains(&first));
    }

    #[rstest]
    fn test_clear_discards_pending_pops() {
        let mut set = make_set(&(0..40).collect::<Vec<_>>());
        set.pop();
        set.clear();
        assert_eq!(set.pop(), None);

        set.add(7);
        assert_eq!(set.pop(), Some(7));
    }

    #[rstest]
    fn test_pop_removes_the_returned_member() {
        let mut set = make_set(&[10]);
        assert_eq!(set.pop(), Some(10));
        assert!(set.is_empty());
        assert_eq!(set.pop(), None);
    }

    #[rstest]
    fn test_random_element_does_not_remove() {
        let set = make_set(&[1, 2, 3]);
        let element = set.random_element().unwrap();
        assert!(set.contains(&element));
        assert_eq!(set.len(), 3);
    }

    #[rstest]
    fn test_random_element_of_empty_set_is_none() {
        let set: UnsafeSet<i32> = UnsafeSet::new();
        assert_eq!(set.random_element(), None);
    }

    #[rstest]
    fn test_join_uses_separator_between_members() {
        let set: UnsafeSet<&str> = ["a", "b"].into_iter().collect();
        let rendered = set.join("|");
        assert!(rendered == "Set{a|b}" || rendered == "Set{b|a}");
    }

    #[rstest]
    fn test_display_uses_comma_separator() {
        let set = make_set(&[5]);
        assert_eq!(format!("{set}"), "Set{5}");
    }

    #[rstest]
    fn test_debug_formats_as_set_literal() {
        let set = make_set(&[5]);
        assert_eq!(format!("{set:?}"), "{5}");
    }

    #[rstest]
    fn test_equal_ignores_hasher() {
        let left = make_set(&[1, 2]);
        let mut right = UnsafeSet::with_hasher(RandomState::new());
        right.add(2);
        right.add(1);
        assert!(left.equal(&right));
    }

    #[rstest]
    fn test_retain_keeps_matching_members() {
        let mut set = make_set(&[1, 2, 3, 4]);
        set.retain(|element| element % 2 == 0);
        assert_eq!(set, make_set(&[2, 4]));
    }

    #[rstest]
    fn test_iter_len_matches_cardinality() {
        let set = make_set(&[1, 2, 3]);
        assert_eq!(set.iter().len(), 3);
        assert_eq!(set.into_iter().count(), 3);
    }
}
