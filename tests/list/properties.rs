//! Property Tests
//!
//! Any sequence of single-threaded operations leaves the list in the same
//! state as the same sequence applied to a plain `Vec`, and natural errors
//! never change the contents.

use crate::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Push(i16),
    Insert(usize, i16),
    Set(usize, i16),
    RemoveAt(usize),
    Remove(i16),
    RemoveRange(usize, usize),
    RemoveAllBelow(i16),
    Clear,
    DeferPush(i16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i16>().prop_map(Op::Push),
        2 => (0usize..24, any::<i16>()).prop_map(|(i, v)| Op::Insert(i, v)),
        2 => (0usize..24, any::<i16>()).prop_map(|(i, v)| Op::Set(i, v)),
        2 => (0usize..24).prop_map(Op::RemoveAt),
        1 => any::<i16>().prop_map(Op::Remove),
        1 => (0usize..24, 0usize..8).prop_map(|(s, n)| Op::RemoveRange(s, n)),
        1 => any::<i16>().prop_map(Op::RemoveAllBelow),
        1 => Just(Op::Clear),
        1 => any::<i16>().prop_map(Op::DeferPush),
    ]
}

/// Apply `op` to both, asserting identical observable results
fn apply(list: &ConcurrentList<i16>, model: &mut Vec<i16>, op: &Op) {
    let len = model.len();
    match *op {
        Op::Push(v) => {
            list.push(v).unwrap();
            model.push(v);
        }
        Op::Insert(i, v) => {
            let result = list.insert(i, v);
            if i <= len {
                result.unwrap();
                model.insert(i, v);
            } else {
                assert_eq!(result, Err(ListError::IndexOutOfRange { index: i, len }));
            }
        }
        Op::Set(i, v) => {
            let result = list.set(i, v);
            if i < len {
                assert_eq!(result.unwrap(), std::mem::replace(&mut model[i], v));
            } else {
                assert!(result.unwrap_err().is_out_of_range());
            }
        }
        Op::RemoveAt(i) => {
            let result = list.remove_at(i);
            if i < len {
                assert_eq!(result.unwrap(), model.remove(i));
            } else {
                assert!(result.unwrap_err().is_out_of_range());
            }
        }
        Op::Remove(v) => {
            let expected = match model.iter().position(|x| *x == v) {
                Some(i) => {
                    model.remove(i);
                    true
                }
                None => false,
            };
            assert_eq!(list.remove(&v).unwrap(), expected);
        }
        Op::RemoveRange(start, count) => {
            let end = start + count;
            let result = list.remove_range(start..end);
            if end <= len {
                let drained: Vec<i16> = model.drain(start..end).collect();
                assert_eq!(result.unwrap(), drained);
            } else {
                assert_eq!(
                    result,
                    Err(ListError::RangeOutOfBounds { start, end, len })
                );
            }
        }
        Op::RemoveAllBelow(threshold) => {
            let before = model.len();
            model.retain(|x| *x >= threshold);
            assert_eq!(
                list.remove_all(|x| *x < threshold).unwrap(),
                before - model.len()
            );
        }
        Op::Clear => {
            list.clear().unwrap();
            model.clear();
        }
        Op::DeferPush(v) => {
            // One deferred push per element; appended after the pass.
            let report = list
                .for_indices(|_| {
                    list.defer_with_items(move |items| {
                        items.push(v);
                        Ok(())
                    })?;
                    Ok(())
                })
                .unwrap();
            assert!(report.is_clean());
            assert_eq!(report.deferred_executed(), len);
            model.extend(std::iter::repeat(v).take(len));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_matches_vec_model(
        initial in proptest::collection::vec(any::<i16>(), 0..16),
        ops in proptest::collection::vec(op_strategy(), 0..48),
    ) {
        let list = ConcurrentList::from_vec(initial.clone());
        let mut model = initial;

        for op in &ops {
            apply(&list, &mut model, op);
            prop_assert_eq!(list.len().unwrap(), model.len());
        }

        prop_assert_eq!(list.to_vec().unwrap(), model.clone());
        prop_assert_eq!(list.snapshot().unwrap().collect::<Vec<_>>(), model);
    }

    #[test]
    fn prop_searches_match_vec(
        items in proptest::collection::vec(-50i16..50, 0..64),
        needle in -50i16..50,
    ) {
        let list = ConcurrentList::from_vec(items.clone());

        prop_assert_eq!(list.contains(&needle).unwrap(), items.contains(&needle));
        prop_assert_eq!(
            list.index_of(&needle).unwrap(),
            items.iter().position(|x| *x == needle)
        );
        prop_assert_eq!(
            list.find_last_index(|x| *x == needle).unwrap(),
            items.iter().rposition(|x| *x == needle)
        );
        prop_assert_eq!(
            list.find_all(|x| *x > needle).unwrap(),
            items.iter().copied().filter(|x| *x > needle).collect::<Vec<_>>()
        );
        prop_assert_eq!(
            list.exists(|x| *x == needle).unwrap(),
            items.iter().any(|x| *x == needle)
        );
    }
}
