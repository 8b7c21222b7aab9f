//! Durations recorded through the chain.

use interpose_core::{DataBag, Dispatcher, Fault, Invocation, ManagedProcessor, Result, ServicePattern};
use interpose_stats::StatisticsProcessor;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn sleeps_are_reflected_in_the_mean() {
    let dispatcher = Dispatcher::new();
    let stats = Arc::new(StatisticsProcessor::builder().build());
    stats.start(&dispatcher);

    let slow = |_: &mut Invocation| -> Result<()> {
        thread::sleep(Duration::from_millis(20));
        Ok(())
    };
    for _ in 0..3 {
        dispatcher
            .dispatch(&slow, &mut Invocation::new("reports.Slow", DataBag::new()))
            .unwrap();
    }

    let stat = stats.estimator().statistic("reports.Slow").unwrap();
    assert_eq!(stat.count, 3);
    assert!(stat.min >= 20.0, "min was {}", stat.min);
    assert!(stat.mean >= stat.min && stat.mean <= stat.max);
    assert!((stat.cumulative - stat.mean * 3.0).abs() < 1e-6);
}

#[test]
fn failures_are_sampled_too() {
    let dispatcher = Dispatcher::new();
    let stats = Arc::new(StatisticsProcessor::builder().build());
    stats.start(&dispatcher);

    let fail = |_: &mut Invocation| -> Result<()> { Err(Fault::general("nope").into()) };
    let _ = dispatcher.dispatch(&fail, &mut Invocation::new("svc", DataBag::new()));

    assert_eq!(stats.estimator().statistic("svc").unwrap().count, 1);
}

#[test]
fn only_matching_services_are_sampled() {
    let dispatcher = Dispatcher::new();
    let stats = Arc::new(
        StatisticsProcessor::builder()
            .service_pattern(ServicePattern::new(r"billing\..*").unwrap())
            .build(),
    );
    stats.start(&dispatcher);

    let ok = |_: &mut Invocation| -> Result<()> { Ok(()) };
    for service in ["billing.Charge", "billing.Refund", "orders.Create"] {
        dispatcher
            .dispatch(&ok, &mut Invocation::new(service, DataBag::new()))
            .unwrap();
    }

    let names: Vec<_> = stats
        .snapshot()
        .services
        .into_iter()
        .map(|s| s.service)
        .collect();
    assert_eq!(names, vec!["billing.Charge", "billing.Refund"]);
}

#[test]
fn concurrent_services_are_counted_exactly() {
    let dispatcher = Arc::new(Dispatcher::new());
    let stats = Arc::new(StatisticsProcessor::builder().buffer_capacity(4).build());
    stats.start(&dispatcher);

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let d = Arc::clone(&dispatcher);
            thread::spawn(move || {
                let ok = |_: &mut Invocation| -> Result<()> { Ok(()) };
                let service = format!("svc{}", i % 2);
                for _ in 0..500 {
                    d.dispatch(&ok, &mut Invocation::new(service.as_str(), DataBag::new()))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.services.len(), 2);
    assert!(snapshot.services.iter().all(|s| s.count == 1_500));
}
