//! Property tests for the statistics estimator.
//!
//! Invariants tested:
//! - Buffered recording matches a direct computation over the samples
//! - No sample is lost whatever the buffer capacity

use interpose_stats::Estimator;
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn matches_direct_computation(
        samples in prop::collection::vec(0.0f64..10_000.0, 1..300),
        capacity in 1usize..32,
    ) {
        let estimator = Estimator::new(capacity);
        for x in &samples {
            estimator.record(*x);
        }
        let acc = estimator.quiesce();

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        prop_assert_eq!(acc.count(), samples.len() as u64);
        prop_assert!(close(acc.mean(), mean), "mean {} vs {}", acc.mean(), mean);
        prop_assert!(close(acc.variance(), variance), "variance {} vs {}", acc.variance(), variance);
        prop_assert_eq!(acc.min(), min);
        prop_assert_eq!(acc.max(), max);
        prop_assert!(close(acc.cumulative(), samples.iter().sum()));
        prop_assert_eq!(estimator.pending(), 0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn concurrent_writers_lose_nothing(
        threads in 2usize..6,
        per_thread in 50usize..400,
        capacity in 1usize..16,
    ) {
        let estimator = Arc::new(Estimator::new(capacity));
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let e = Arc::clone(&estimator);
                thread::spawn(move || {
                    for i in 0..per_thread {
                        e.record(i as f64);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let acc = estimator.quiesce();
        prop_assert_eq!(acc.count(), (threads * per_thread) as u64);
        prop_assert_eq!(acc.max(), (per_thread - 1) as f64);
        prop_assert_eq!(acc.min(), 0.0);
    }
}
