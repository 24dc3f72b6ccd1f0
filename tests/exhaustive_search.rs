use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use bitforce::{
    brute_force, count, count_range, hamming_distance, BitFlipApplicator, BruteForcer,
    ProgressSink, SearchConfig, UnitWidth,
};

fn observe_all(buffer: &[u8], min: usize, max: usize, workers: usize) -> HashSet<Vec<u8>> {
    let seen = Mutex::new(HashSet::new());
    let duplicates = AtomicUsize::new(0);
    let found = BruteForcer::new(SearchConfig::new(min, max).with_workers(workers))
        .search_infallible(buffer, &seen, |seen, candidate| {
            if !seen.lock().unwrap().insert(candidate.to_vec()) {
                duplicates.fetch_add(1, Ordering::Relaxed);
            }
            false
        })
        .expect("search");
    assert!(found.is_none());
    assert_eq!(duplicates.load(Ordering::Relaxed), 0);
    seen.into_inner().unwrap()
}

#[test]
fn four_zero_bytes_up_to_distance_four() {
    let buffer = [0u8; 4];
    for workers in [0, 1, 3, 8] {
        let seen = observe_all(&buffer, 0, 4, workers);
        assert_eq!(seen.len(), 41449, "workers={workers}");
        assert_eq!(seen.len() as u128, count_range(32, 0, 4).unwrap());
    }
}

#[test]
fn every_candidate_within_distance_bounds() {
    let buffer = [0xA5u8, 0x3C, 0xFF];
    let seen = observe_all(&buffer, 2, 3, 4);
    let mut per_distance = [0u128; 4];
    for candidate in &seen {
        let d = hamming_distance(&buffer, candidate);
        assert!((2..=3).contains(&d), "distance {d}");
        per_distance[d] += 1;
    }
    assert_eq!(per_distance[2], count(24, 2).unwrap());
    assert_eq!(per_distance[3], count(24, 3).unwrap());
}

#[test]
fn finds_single_bit_error() {
    let buffer = [0u8; 4];
    let target = [0u8, 0, 0, 1];
    let found = brute_force(
        &buffer,
        UnitWidth::U8,
        0,
        4,
        &target,
        |target, candidate| candidate == target,
        BitFlipApplicator::new(UnitWidth::U8),
        0,
    )
    .unwrap();
    assert_eq!(found, Some(target.to_vec()));
}

#[test]
fn single_worker_stops_at_first_match() {
    let buffer = [0u8; 4];
    let calls = AtomicUsize::new(0);
    let farthest = AtomicUsize::new(0);
    let found = BruteForcer::new(SearchConfig::new(0, 4).with_workers(1))
        .search_infallible(&buffer, &(), |_, candidate| {
            calls.fetch_add(1, Ordering::Relaxed);
            farthest.fetch_max(hamming_distance(&buffer, candidate), Ordering::Relaxed);
            candidate == [0, 0, 0, 1]
        })
        .unwrap()
        .unwrap();
    assert_eq!(found.distance, 1);
    assert_eq!(found.positions, vec![24]);
    // the unmodified buffer, then ranks 0..=24 of layer 1
    assert_eq!(calls.load(Ordering::Relaxed), 26);
    assert_eq!(farthest.load(Ordering::Relaxed), 1);
}

#[test]
fn later_layers_never_start_after_a_match() {
    let buffer = [0x5Au8; 6];
    let mut target = buffer;
    target[2] ^= 0b0001_0100;
    let farthest = AtomicUsize::new(0);
    let found = BruteForcer::new(SearchConfig::new(1, 4).with_workers(8))
        .search_infallible(&buffer, &(), |_, candidate| {
            farthest.fetch_max(hamming_distance(&buffer, candidate), Ordering::Relaxed);
            candidate == target
        })
        .unwrap()
        .unwrap();
    assert_eq!(found.buffer, target.to_vec());
    assert_eq!(found.positions, vec![18, 20]);
    assert_eq!(farthest.load(Ordering::Relaxed), 2);
}

#[test]
fn no_match_returns_none() {
    let buffer = [0xFFu8; 2];
    let found = BruteForcer::new(SearchConfig::new(1, 3).with_workers(2))
        .search_infallible(&buffer, &(), |_, candidate| candidate == [0xFF, 0xFF])
        .unwrap();
    assert!(found.is_none());
}

#[test]
fn all_units_visit_the_same_candidates() {
    let buffer = [0x01u8, 0x80, 0x7E, 0x00, 0xC3];
    let expected = observe_all(&buffer, 0, 2, 1);
    for unit in [UnitWidth::U16, UnitWidth::U32, UnitWidth::U64] {
        let seen = Mutex::new(HashSet::new());
        BruteForcer::new(SearchConfig::new(0, 2).with_unit(unit).with_workers(4))
            .search_infallible(&buffer, &seen, |seen, candidate| {
                seen.lock().unwrap().insert(candidate.to_vec());
                false
            })
            .unwrap();
        assert_eq!(seen.into_inner().unwrap(), expected, "{unit:?}");
    }
}

#[derive(Default)]
struct CountingSink {
    layers: AtomicUsize,
    finished: AtomicUsize,
    evaluated: AtomicU64,
}

impl ProgressSink for CountingSink {
    fn layer_started(&self, _distance: usize, _candidates: u128) {
        self.layers.fetch_add(1, Ordering::Relaxed);
    }

    fn advance(&self, evaluated: u64) {
        self.evaluated.fetch_add(evaluated, Ordering::Relaxed);
    }

    fn layer_finished(&self, _distance: usize) {
        self.finished.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn progress_accounts_for_every_candidate() {
    let sink = CountingSink::default();
    BruteForcer::new(SearchConfig::new(0, 4).with_workers(3))
        .with_progress(&sink)
        .search_infallible(&[0u8; 4], &(), |_, _| false)
        .unwrap();
    assert_eq!(sink.layers.load(Ordering::Relaxed), 5);
    assert_eq!(sink.finished.load(Ordering::Relaxed), 5);
    assert_eq!(sink.evaluated.load(Ordering::Relaxed), 41449);
}
