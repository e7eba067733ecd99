//! Scored candidates and the order used to pick the best one.

use crate::world::CityId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A scored (source, destination, arrival time) triple.
///
/// `dest == None` is the not-viable sentinel: its value is negative infinity
/// so any real candidate, even one worth nothing, outranks it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaravanResult {
    pub src: CityId,
    pub dest: Option<CityId>,
    pub arrival_time: u32,
    pub value: f64,
    pub help_wonder: bool,
    /// Source and destination are on different continents.
    pub required_boat: bool,
}

impl CaravanResult {
    pub fn not_viable(src: CityId) -> Self {
        Self {
            src,
            dest: None,
            arrival_time: 0,
            value: f64::NEG_INFINITY,
            help_wonder: false,
            required_boat: false,
        }
    }

    pub fn is_viable(&self) -> bool {
        self.dest.is_some()
    }
}

/// Total order over results: higher value wins; at equal value the earlier
/// arrival wins.
pub fn compare_results(a: &CaravanResult, b: &CaravanResult) -> Ordering {
    a.value
        .total_cmp(&b.value)
        .then_with(|| b.arrival_time.cmp(&a.arrival_time))
}

/// Sort collected results best-first.
pub fn rank_results(results: &mut [CaravanResult]) {
    results.sort_by(|a, b| compare_results(b, a));
}

/// Running best over a stream of candidates.
#[derive(Debug, Clone)]
pub struct BestResult {
    best: CaravanResult,
}

impl BestResult {
    pub fn new(src: CityId) -> Self {
        Self {
            best: CaravanResult::not_viable(src),
        }
    }

    /// Keep `candidate` if it strictly beats the current best.
    pub fn offer(&mut self, candidate: CaravanResult) -> bool {
        if compare_results(&candidate, &self.best) == Ordering::Greater {
            self.best = candidate;
            true
        } else {
            false
        }
    }

    pub fn get(&self) -> &CaravanResult {
        &self.best
    }

    pub fn into_inner(self) -> CaravanResult {
        self.best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(dest: CityId, value: f64, arrival_time: u32) -> CaravanResult {
        CaravanResult {
            src: 1,
            dest: Some(dest),
            arrival_time,
            value,
            help_wonder: false,
            required_boat: false,
        }
    }

    #[test]
    fn test_higher_value_wins() {
        let a = result(2, 10.0, 5);
        let b = result(3, 9.0, 0);
        assert_eq!(compare_results(&a, &b), Ordering::Greater);
        assert_eq!(compare_results(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_equal_value_faster_wins() {
        let fast = result(2, 10.0, 1);
        let slow = result(3, 10.0, 4);
        assert_eq!(compare_results(&fast, &slow), Ordering::Greater);
    }

    #[test]
    fn test_identical_keys_compare_equal() {
        let a = result(2, 10.0, 3);
        let b = result(3, 10.0, 3);
        assert_eq!(compare_results(&a, &b), Ordering::Equal);
    }

    #[test]
    fn test_sentinel_loses_to_zero_value() {
        let sentinel = CaravanResult::not_viable(1);
        let zero = result(2, 0.0, 9);
        assert_eq!(compare_results(&zero, &sentinel), Ordering::Greater);
        assert!(!sentinel.is_viable());
    }

    #[test]
    fn test_sentinel_loses_to_negative_value() {
        let sentinel = CaravanResult::not_viable(1);
        let negative = result(2, -50.0, 0);
        assert_eq!(compare_results(&negative, &sentinel), Ordering::Greater);
    }

    #[test]
    fn test_best_result_keeps_first_of_equals() {
        let mut best = BestResult::new(1);
        assert!(best.offer(result(2, 5.0, 2)));
        assert!(!best.offer(result(3, 5.0, 2)));
        assert_eq!(best.get().dest, Some(2));
        // Re-offering the incumbent is a no-op
        assert!(!best.offer(*best.get()));
        assert_eq!(best.into_inner().dest, Some(2));
    }

    #[test]
    fn test_rank_results_best_first() {
        let mut results = vec![
            result(2, 1.0, 0),
            CaravanResult::not_viable(1),
            result(3, 8.0, 6),
            result(4, 8.0, 2),
        ];
        rank_results(&mut results);
        let order: Vec<_> = results.iter().map(|r| r.dest).collect();
        assert_eq!(order, vec![Some(4), Some(3), Some(2), None]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_result() -> impl Strategy<Value = CaravanResult> {
        (0..5u32, -100.0..100.0f64, 0..10u32).prop_map(|(dest, value, arrival_time)| {
            CaravanResult {
                src: 0,
                dest: Some(dest),
                arrival_time,
                value,
                help_wonder: false,
                required_boat: false,
            }
        })
    }

    proptest! {
        #[test]
        fn prop_compare_is_antisymmetric(a in arb_result(), b in arb_result()) {
            prop_assert_eq!(compare_results(&a, &b), compare_results(&b, &a).reverse());
        }

        #[test]
        fn prop_compare_is_transitive(a in arb_result(), b in arb_result(), c in arb_result()) {
            if compare_results(&a, &b) != Ordering::Less && compare_results(&b, &c) != Ordering::Less {
                prop_assert_ne!(compare_results(&a, &c), Ordering::Less);
            }
        }

        #[test]
        fn prop_best_of_stream_is_maximum(results in proptest::collection::vec(arb_result(), 0..20)) {
            let mut best = BestResult::new(0);
            for r in &results {
                best.offer(*r);
            }
            for r in &results {
                prop_assert_ne!(compare_results(r, best.get()), Ordering::Greater);
            }
        }
    }
}
