//! Statistics metrics regression tests

use super::helpers::*;
use interpose_core::{DataBag, Dispatcher, Invocation, ManagedProcessor, Result};
use interpose_stats::StatisticsProcessor;
use serial_test::serial;
use std::sync::Arc;

#[test]
#[serial]
fn service_duration_histogram_exists() {
    init_recorder();

    let dispatcher = Dispatcher::new();
    let stats = Arc::new(StatisticsProcessor::builder().build());
    stats.start(&dispatcher);

    let ok = |_: &mut Invocation| -> Result<()> { Ok(()) };
    dispatcher
        .dispatch(&ok, &mut Invocation::new("metrics.Sampled", DataBag::new()))
        .unwrap();

    assert_histogram_exists("interpose_service_duration_ms");
    assert_metric_has_label("interpose_service_duration_ms", "service", "metrics.Sampled");
}
