//! Snapshot Enumeration Tests
//!
//! Enumeration copies under the gate and iterates unlocked: no torn state,
//! no concurrent-modification failure, no gate held after the copy.

use crate::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

#[test]
fn test_snapshot_reflects_point_in_time() {
    let list = create_list(5);
    let snapshot = list.snapshot().unwrap();

    list.push(5).unwrap();
    list.remove_at(0).unwrap();

    assert_eq!(snapshot.len(), 5);
    assert_eq!(snapshot.collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    assert_eq!(list.to_vec().unwrap(), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_abandoned_snapshot_does_not_hold_gate() {
    let list = create_list(100);
    {
        let mut snapshot = list.snapshot().unwrap();
        assert_eq!(snapshot.next(), Some(0));
        // Iteration stops early and the iterator is dropped here.
    }
    let leaked = list.snapshot().unwrap();
    std::mem::forget(leaked);

    list.push(100).unwrap();
    assert_eq!(list.len().unwrap(), 101);
}

#[test]
fn test_enumeration_during_concurrent_mutation() {
    const START: i32 = 20_000;
    const ROUNDS: i32 = 2_000;
    let list = create_labeled_list("enumerated", START);
    let stop = Arc::new(AtomicBool::new(false));

    // Each round removes one element and adds one back, so every consistent
    // state has START or START - 1 elements.
    let mutator = {
        let list = Arc::clone(&list);
        thread::spawn(move || {
            for i in 0..ROUNDS {
                assert!(list.remove(&(500 + i)).unwrap());
                list.push(-42).unwrap();
                list.remove_at(10_000).unwrap();
                list.insert(10_000, -100).unwrap();
            }
        })
    };

    let enumerator = {
        let list = Arc::clone(&list);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut passes = 0;
            while !stop.load(Ordering::SeqCst) {
                let snapshot = list.snapshot().unwrap();
                let expected_len = snapshot.len();
                assert!(
                    expected_len == START as usize || expected_len == START as usize - 1,
                    "torn length {}",
                    expected_len
                );
                assert_eq!(snapshot.count(), expected_len);
                passes += 1;
            }
            passes
        })
    };

    mutator.join().unwrap();
    stop.store(true, Ordering::SeqCst);
    let passes = enumerator.join().unwrap();

    assert!(passes > 0);
    assert!(!list.contains(&500).unwrap());
    assert_eq!(list.len().unwrap(), START as usize);
}

#[test]
fn test_snapshot_is_double_ended_and_fused() {
    let list = create_list(4);
    let mut snapshot = list.snapshot().unwrap();
    assert_eq!(snapshot.next_back(), Some(3));
    assert_eq!(snapshot.as_slice(), &[0, 1, 2]);
    assert_eq!(snapshot.by_ref().count(), 3);
    assert_eq!(snapshot.next(), None);
    assert_eq!(snapshot.next_back(), None);
}
