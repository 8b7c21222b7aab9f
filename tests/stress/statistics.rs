//! Statistics stress tests

use super::hammer;
use interpose_core::{DataBag, Dispatcher, Invocation, ManagedProcessor, Result};
use interpose_stats::StatisticsProcessor;
use std::sync::Arc;

/// Test: Every sample is counted under heavy contention
#[test]
#[ignore]
fn stress_sampling_under_contention() {
    let dispatcher = Arc::new(Dispatcher::new());
    let stats = Arc::new(StatisticsProcessor::builder().buffer_capacity(8).build());
    stats.start(&dispatcher);

    hammer(&dispatcher, 32, 25_000, |d, t, _| {
        let ok = |_: &mut Invocation| -> Result<()> { Ok(()) };
        let service = if t % 2 == 0 { "even" } else { "odd" };
        d.dispatch(&ok, &mut Invocation::new(service, DataBag::new()))
            .unwrap();
    });

    let snapshot = stats.snapshot();
    let total: u64 = snapshot.services.iter().map(|s| s.count).sum();
    println!("{:#?}", snapshot.services);

    assert_eq!(snapshot.services.len(), 2);
    assert_eq!(total, 800_000);
}
