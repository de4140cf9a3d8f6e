//! Multi-threaded stress tests for `SafeSet`.
//!
//! These tests hammer one shared set from several threads and check that no
//! update is lost, that readers always observe a consistent set, and that
//! the lock discipline of `equal` does not deadlock.
//!
//! Exhaustive interleaving checks live in `safe_set_loom_tests.rs`.

#![cfg(not(loom))]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use mapset::SafeSet;
use rstest::rstest;

const THREAD_COUNT: usize = 8;

#[rstest]
#[case(8)]
#[case(64)]
#[case(512)]
fn test_concurrent_adds_lose_no_updates(#[case] element_count: usize) {
    let set = Arc::new(SafeSet::new());
    let barrier = Arc::new(Barrier::new(element_count));

    let handles: Vec<_> = (0..element_count)
        .map(|element| {
            let set = Arc::clone(&set);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                set.add(element)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().expect("Thread panicked"));
    }

    assert_eq!(set.len(), element_count);
    for element in 0..element_count {
        assert!(set.contains(&element));
    }
}

#[rstest]
fn test_concurrent_adds_of_the_same_element_insert_once() {
    let set = Arc::new(SafeSet::new());

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|_| {
            let set = Arc::clone(&set);
            thread::spawn(move || set.add("shared"))
        })
        .collect();

    let inserted = handles
        .into_iter()
        .map(|handle| handle.join().expect("Thread panicked"))
        .filter(|inserted| *inserted)
        .count();

    assert_eq!(inserted, 1);
    assert_eq!(set.len(), 1);
}

#[rstest]
fn test_concurrent_clear_and_add_keep_cardinality_sane() {
    const PER_THREAD: usize = 1_000;
    let set = Arc::new(SafeSet::new());

    let writers: Vec<_> = (0..THREAD_COUNT)
        .map(|thread_index| {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                for offset in 0..PER_THREAD {
                    set.add(thread_index * PER_THREAD + offset);
                    if offset % 97 == 0 {
                        set.clear();
                    }
                    let observed = set.len();
                    assert!(observed <= THREAD_COUNT * PER_THREAD);
                }
            })
        })
        .collect();

    for handle in writers {
        handle.join().expect("Thread panicked");
    }

    let snapshot = set.to_vec();
    assert_eq!(snapshot.len(), set.len());
    assert!(set.len() <= THREAD_COUNT * PER_THREAD);

    set.clear();
    assert_eq!(set.len(), 0);
}

#[rstest]
fn test_concurrent_pops_return_each_member_exactly_once() {
    const ELEMENT_COUNT: usize = 10_000;
    let set: Arc<SafeSet<usize>> = Arc::new((0..ELEMENT_COUNT).collect());

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|_| {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                let mut popped = Vec::new();
                while let Some(element) = set.pop() {
                    popped.push(element);
                }
                popped
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for element in handle.join().expect("Thread panicked") {
            assert!(seen.insert(element), "{element} popped twice");
        }
    }

    assert_eq!(seen.len(), ELEMENT_COUNT);
    assert!(set.is_empty());
    assert_eq!(set.pop(), None);
}

#[rstest]
fn test_readers_observe_consistent_snapshots_during_writes() {
    let set = Arc::new(SafeSet::new());
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let set = Arc::clone(&set);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for round in 0..2_000_u32 {
                // members always come in pairs (n, n + 1_000_000)
                set.add_all([round, round + 1_000_000]);
                if round % 3 == 0 {
                    set.clear();
                }
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let readers: Vec<_> = (0..THREAD_COUNT / 2)
        .map(|_| {
            let set = Arc::clone(&set);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::SeqCst) {
                    let snapshot = set.to_vec();
                    assert_eq!(snapshot.len() % 2, 0);

                    let clone = set.clone_set();
                    assert_eq!(clone.len() % 2, 0);
                    assert_eq!(clone.to_vec().len(), clone.len());
                }
            })
        })
        .collect();

    writer.join().expect("Thread panicked");
    for reader in readers {
        reader.join().expect("Thread panicked");
    }
}

#[rstest]
fn test_opposite_order_equal_with_queued_writers_completes() {
    const ROUNDS: usize = 2_000;
    let left: Arc<SafeSet<usize>> = Arc::new((0..64).collect());
    let right: Arc<SafeSet<usize>> = Arc::new((0..64).collect());

    let comparer = |first: Arc<SafeSet<usize>>, second: Arc<SafeSet<usize>>| {
        thread::spawn(move || {
            for _ in 0..ROUNDS {
                let _ = first.equal(&second);
            }
        })
    };
    let mutator = |target: Arc<SafeSet<usize>>| {
        thread::spawn(move || {
            for round in 0..ROUNDS {
                target.add(1_000 + round % 8);
                target.remove(&(1_000 + round % 8));
            }
        })
    };

    let handles = vec![
        comparer(Arc::clone(&left), Arc::clone(&right)),
        comparer(Arc::clone(&right), Arc::clone(&left)),
        mutator(Arc::clone(&left)),
        mutator(Arc::clone(&right)),
    ];

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(left.equal(&right));
}

#[rstest]
fn test_each_holds_a_consistent_view_while_writers_wait() {
    let set: Arc<SafeSet<u32>> = Arc::new((0..100).collect());
    let writer_started = Arc::new(Barrier::new(2));

    let mut visited = 0;
    let mut writer = None;
    set.each(|_| {
        if visited == 0 {
            let shared = Arc::clone(&set);
            let gate = Arc::clone(&writer_started);
            writer = Some(thread::spawn(move || {
                gate.wait();
                shared.clear();
            }));
            writer_started.wait();
        }
        visited += 1;
        false
    });

    // the clear could not interleave with the traversal
    assert_eq!(visited, 100);

    writer
        .expect("writer spawned on the first visit")
        .join()
        .expect("Thread panicked");
    assert!(set.is_empty());
}
