#![cfg(not(loom))]
//! Tests for the construction helpers and conversions of both set types.

use mapset::{
    MapSet, SafeSet, UnsafeSet, map_set, new_set, new_unsafe_set, set_from, unsafe_set,
    unsafe_set_from,
};
use rstest::rstest;

// =============================================================================
// Free Functions
// =============================================================================

#[rstest]
fn test_new_set_starts_empty() {
    let set: SafeSet<i32> = new_set();
    assert_eq!(set.len(), 0);

    let plain: UnsafeSet<i32> = new_unsafe_set();
    assert_eq!(plain.len(), 0);
}

#[rstest]
#[case(vec![], 0)]
#[case(vec![1], 1)]
#[case(vec![1, 2], 2)]
#[case(vec![1, 1, 2, 2, 3], 3)]
fn test_set_from_collapses_duplicates(#[case] elements: Vec<i32>, #[case] expected: usize) {
    assert_eq!(set_from(elements.clone()).len(), expected);
    assert_eq!(unsafe_set_from(elements).len(), expected);
}

#[rstest]
fn test_set_from_matches_incremental_adds() {
    let built = set_from(["a", "b"]);
    let incremental = SafeSet::new();
    incremental.add("b");
    incremental.add("a");
    assert!(built.equal(&incremental));
}

// =============================================================================
// Macros
// =============================================================================

#[rstest]
fn test_map_set_macro_builds_safe_set() {
    let set = map_set![1, 2, 2, 3,];
    assert_eq!(set.len(), 3);
    assert!(set.contains_all(&[1, 2, 3]));

    let empty: SafeSet<&str> = map_set![];
    assert!(empty.is_empty());
}

#[rstest]
fn test_unsafe_set_macro_builds_unsafe_set() {
    let mut set = unsafe_set!["x", "y"];
    assert!(set.add("z"));
    assert_eq!(set, unsafe_set!["z", "y", "x"]);

    let empty: UnsafeSet<i32> = unsafe_set![];
    assert!(empty.is_empty());
}

// =============================================================================
// Conversions
// =============================================================================

#[rstest]
fn test_from_array_and_vec() {
    assert_eq!(UnsafeSet::from([1, 2, 1]).len(), 2);
    assert_eq!(UnsafeSet::from(vec![1, 2, 1]).len(), 2);
    assert_eq!(SafeSet::from([1, 2, 1]).len(), 2);
    assert_eq!(SafeSet::from(vec![1, 2, 1]).len(), 2);
}

#[rstest]
fn test_unsafe_set_wraps_into_safe_set_and_back() {
    let plain = UnsafeSet::from([4, 5, 6]);
    let safe = SafeSet::from(plain.clone());
    assert_eq!(safe.into_inner(), plain);
}

#[rstest]
fn test_extend_adds_new_members_only() {
    let mut plain = UnsafeSet::from([1]);
    plain.extend([1, 2, 3]);
    assert_eq!(plain.len(), 3);

    let mut safe = SafeSet::from([1]);
    safe.extend([1, 2, 3]);
    assert_eq!(safe.len(), 3);
    assert_eq!(safe.add_all([3, 4, 5]), 2);
}

#[rstest]
fn test_into_iterator_yields_every_member() {
    let mut from_safe: Vec<_> = SafeSet::from([3, 1, 2]).into_iter().collect();
    from_safe.sort_unstable();
    assert_eq!(from_safe, vec![1, 2, 3]);

    let plain = UnsafeSet::from([3, 1, 2]);
    let mut borrowed: Vec<_> = (&plain).into_iter().copied().collect();
    borrowed.sort_unstable();
    assert_eq!(borrowed, vec![1, 2, 3]);
}

#[rstest]
fn test_default_is_empty() {
    assert!(UnsafeSet::<i32>::default().is_empty());
    assert!(SafeSet::<i32>::default().is_empty());
}

#[rstest]
fn test_std_clone_of_safe_set_is_independent() {
    let original = SafeSet::from([1, 2]);
    let copy = original.clone();
    copy.clear();
    assert_eq!(original.len(), 2);
}

#[rstest]
fn test_clone_set_via_trait_on_unsafe_set() {
    let original = UnsafeSet::from([1, 2]);
    let mut copy = MapSet::clone_set(&original);
    copy.remove(&1);
    assert_eq!(original.len(), 2);
    assert_eq!(copy.len(), 1);
}

#[rstest]
fn test_display_wraps_members() {
    assert_eq!(SafeSet::from([7]).to_string(), "Set{7}");
    assert_eq!(UnsafeSet::<i32>::new().to_string(), "Set{}");
}

// =============================================================================
// Hasher Aliases
// =============================================================================

#[cfg(feature = "fxhash")]
#[rstest]
fn test_fxhash_sets_behave_like_default_sets() {
    let mut plain = mapset::FxUnsafeSet::default();
    assert!(plain.add("alpha"));
    assert!(!plain.add("alpha"));

    let safe: mapset::FxSafeSet<i32> = (0..10).collect();
    assert_eq!(safe.len(), 10);
    assert!(safe.contains_all(&[0, 9]));
}

#[cfg(feature = "ahash")]
#[rstest]
fn test_ahash_sets_behave_like_default_sets() {
    let mut plain = mapset::AUnsafeSet::default();
    assert!(plain.add(1_u64));
    assert!(plain.contains(&1));

    let safe: mapset::ASafeSet<u64> = (0..10).collect();
    let plain_copy: mapset::AUnsafeSet<u64> = (0..10).collect();
    assert!(safe.into_inner().equal(&plain_copy));
}
