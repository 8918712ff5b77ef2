// Randomized model check: OrderedMap / OrderedSet against std's BTreeMap.
//
// Small node sizes force frequent splits, rotations and merges. Every
// operation is mirrored on the reference map and the full contents are
// compared, together with structural validation, after each step.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use steno_btree::{OrderedMap, OrderedMultiMap, OrderedSet};

fn assert_same(map: &OrderedMap<u16, u32>, model: &BTreeMap<u16, u32>) {
    map.validate().unwrap();
    assert_eq!(map.len(), model.len());
    assert!(map.iter().map(|(k, v)| (*k, *v)).eq(model.iter().map(|(k, v)| (*k, *v))));
    assert!(
        map.iter()
            .rev()
            .map(|(k, v)| (*k, *v))
            .eq(model.iter().rev().map(|(k, v)| (*k, *v)))
    );
}

#[test]
fn random_insert_remove_matches_model() {
    for (seed, max_size) in [(1u64, 3usize), (2, 4), (3, 5), (4, 8), (5, 32)] {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut map = OrderedMap::with_max_size(max_size);
        let mut model = BTreeMap::new();
        for step in 0..3000u32 {
            let key: u16 = rng.gen_range(0..400);
            if rng.gen_bool(0.6) {
                assert_eq!(map.insert(key, step), model.insert(key, step));
            } else {
                assert_eq!(map.remove(&key), model.remove(&key));
            }
            if step % 50 == 0 {
                assert_same(&map, &model);
            }
        }
        assert_same(&map, &model);

        // Drain to empty; height must collapse back to one leaf.
        let keys: Vec<u16> = model.keys().copied().collect();
        for key in keys {
            assert_eq!(map.remove(&key), model.remove(&key));
        }
        assert!(map.is_empty());
        assert_eq!(map.height(), 1);
        map.validate().unwrap();
    }
}

#[test]
fn random_cursor_removal_matches_model() {
    let mut rng = StdRng::seed_from_u64(42);
    for max_size in [3usize, 4, 6] {
        let mut map = OrderedMap::with_max_size(max_size);
        let mut model = BTreeMap::new();
        for _ in 0..800 {
            let key: u16 = rng.gen_range(0..2000);
            map.insert(key, u32::from(key));
            model.insert(key, u32::from(key));
        }

        // Walk from a random start, removing a random subset in place.
        let start: u16 = rng.gen_range(0..2000);
        let mut cursor = map.lower_bound_mut(&start);
        let mut expected = model.range(start..).map(|(k, _)| *k);
        let mut doomed = Vec::new();
        while let Some(&key) = cursor.key() {
            assert_eq!(Some(key), expected.next());
            if rng.gen_bool(0.5) {
                assert_eq!(cursor.remove_current(), Some((key, u32::from(key))));
                doomed.push(key);
            } else {
                cursor.move_next();
            }
        }
        assert_eq!(expected.next(), None);
        for key in doomed {
            model.remove(&key);
        }
        assert_same(&map, &model);

        // Walk backwards across the whole map, removing again.
        let mut cursor = map.lower_bound_mut(&u16::MAX);
        cursor.move_prev();
        let mut doomed = Vec::new();
        while let Some(&key) = cursor.key() {
            if rng.gen_bool(0.3) {
                // Lands on the successor (or the ghost), so one step back
                // reaches the removed entry's predecessor.
                cursor.remove_current();
                doomed.push(key);
            }
            cursor.move_prev();
        }
        for key in doomed {
            model.remove(&key);
        }
        assert_same(&map, &model);
    }
}

#[test]
fn sorted_bulk_load_matches_model() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut pairs: Vec<(u16, u32)> = (0..1500).map(|_| (rng.gen_range(0..5000), rng.r#gen())).collect();
    pairs.sort_by_key(|p| p.0);
    pairs.dedup_by_key(|p| p.0);

    let mut map = OrderedMap::with_max_size(5);
    map.extend_sorted(pairs.iter().copied());
    let model: BTreeMap<u16, u32> = pairs.iter().copied().collect();
    assert_same(&map, &model);

    // Mostly sorted input with a late disorder falls back to inserts.
    let mut tail: Vec<(u16, u32)> = (6000..6100).map(|k| (k, 0)).collect();
    tail.push((3, 1));
    tail.push((7000, 2));
    map.extend_sorted(tail.iter().copied());
    let mut model = model;
    model.extend(tail);
    assert_same(&map, &model);
}

#[test]
fn set_and_multimap_follow_model() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut set = OrderedSet::with_max_size(3);
    let mut multi = OrderedMultiMap::with_max_size(4);
    let mut model: BTreeMap<u8, Vec<u8>> = BTreeMap::new();
    for _ in 0..2000 {
        let key: u8 = rng.gen_range(0..40);
        let value: u8 = rng.gen_range(0..6);
        if rng.gen_bool(0.7) {
            set.insert(key);
            let values = model.entry(key).or_default();
            let added = multi.insert(key, value);
            assert_eq!(added, !values.contains(&value));
            if added {
                values.push(value);
                values.sort_unstable();
            }
        } else {
            let removed = multi.remove(&key, &value);
            if let Some(values) = model.get_mut(&key) {
                let present = values.contains(&value);
                assert_eq!(removed, present);
                values.retain(|v| *v != value);
            } else {
                assert!(!removed);
            }
        }
    }
    set.validate().unwrap();
    multi.validate().unwrap();
    let keys: Vec<u8> = set.iter().copied().collect();
    assert_eq!(keys, model.keys().copied().collect::<Vec<_>>());
    for (key, values) in &model {
        let stored: Vec<u8> = multi.get_all(key).copied().collect();
        assert_eq!(&stored, values);
    }
}
