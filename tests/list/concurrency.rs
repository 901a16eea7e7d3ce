//! Mutual Exclusion Tests
//!
//! Tests for thread safety:
//! - Concurrent adds (no lost updates)
//! - Concurrent removes
//! - Mixed add/remove/insert keeping the count stable

use crate::*;
use std::sync::Barrier;
use std::thread;

/// Two threads each add half of 0..10_000 (even/odd split)
#[test]
fn test_concurrent_adds_even_odd_split() {
    init_tracing();
    const COUNT: i32 = 10_000;
    let list = Arc::new(ConcurrentList::new());
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = [0, 1]
        .into_iter()
        .map(|parity| {
            let list = Arc::clone(&list);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut errors = 0;
                for i in (0..COUNT).filter(|i| i % 2 == parity) {
                    if list.push(i).is_err() {
                        errors += 1;
                    }
                }
                errors
            })
        })
        .collect();

    let errors: i32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(errors, 0);
    assert_eq!(list.len().unwrap(), COUNT as usize);

    let mut values = list.to_vec().unwrap();
    values.sort_unstable();
    assert_eq!(values, (0..COUNT).collect::<Vec<_>>());
}

/// Two threads each remove half of 0..10_000
#[test]
fn test_concurrent_removes_even_odd_split() {
    const COUNT: i32 = 10_000;
    let list = create_list(COUNT);
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = [0, 1]
        .into_iter()
        .map(|parity| {
            let list = Arc::clone(&list);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in (0..COUNT).filter(|i| i % 2 == parity) {
                    assert!(list.remove(&i).unwrap(), "{} already removed", i);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(list.len().unwrap(), 0);
}

/// One thread removes 2 items per round, another adds 2; count is preserved
#[test]
fn test_mixed_mutation_preserves_count() {
    const START: i32 = 20_000;
    const ROUNDS: i32 = 2_000;
    let list = create_labeled_list("mixed", START);

    let remover = {
        let list = Arc::clone(&list);
        thread::spawn(move || {
            for i in 0..ROUNDS {
                assert!(list.remove(&(500 + i)).unwrap());
                assert!(list.remove(&(10_000 + i)).unwrap());
            }
        })
    };
    let adder = {
        let list = Arc::clone(&list);
        thread::spawn(move || {
            for _ in 0..ROUNDS {
                list.push(-42).unwrap();
                list.insert(5_000, -100).unwrap();
            }
        })
    };

    remover.join().unwrap();
    adder.join().unwrap();

    assert!(!list.contains(&500).unwrap());
    assert!(!list.contains(&10_000).unwrap());
    assert!(list.contains(&-42).unwrap());
    assert_eq!(list.len().unwrap(), START as usize);
}

/// Many threads hammer every kind of member at once
#[test]
fn test_many_threads_many_members() {
    const THREADS: usize = 8;
    const OPS: i32 = 300;
    let list = create_list(0);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let list = Arc::clone(&list);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..OPS {
                    let value = (t as i32) * OPS + i;
                    list.push(value).unwrap();
                    assert!(list.contains(&value).unwrap());
                    list.for_each(|_| Ok(())).unwrap();
                    let _ = list.snapshot().unwrap().count();
                    if i % 3 == 0 {
                        assert!(list.remove(&value).unwrap());
                    }
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let removed_per_thread = (0..OPS).filter(|i| i % 3 == 0).count();
    assert_eq!(
        list.len().unwrap(),
        THREADS * (OPS as usize - removed_per_thread)
    );
}
