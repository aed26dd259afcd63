//! Integration tests for timed spans through the process-wide collector.
//!
//! These tests are in a separate integration test binary to avoid polluting
//! the global collector used by other tests. All checks run in one test function
//! because they share the process-wide collector and its single sink.

#![allow(clippy::indexing_slicing, reason = "panic is fine in tests")]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use minutely::{MemorySink, MetricPoints, Segments, Sink, StatRecord};

/// Sleeps never end early but may overshoot on a busy machine.
const OVERSHOOT_TOLERANCE_SECS: f64 = 0.05;

fn assert_about(actual: Option<f64>, expected: f64) {
    let actual = actual.unwrap();
    assert!(
        actual >= expected - f64::EPSILON && actual <= expected + OVERSHOOT_TOLERANCE_SECS,
        "expected about {expected}, got {actual}"
    );
}

/// Flushes the global collector and returns the single value of the single metric.
fn flush_single(sink: &MemorySink, expected_metric: &str) -> StatRecord {
    minutely::flush().unwrap();

    let payloads = sink.take();
    assert_eq!(payloads.len(), 1);

    let payload = &payloads[0];
    assert_eq!(payload.len(), 1);
    assert_eq!(payload[0].metric(), expected_metric);

    let points = payload[0].points();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].values().len(), 1);

    points[0].values()[0].clone()
}

#[test]
fn timed_spans_through_global_collector() {
    let sink = Arc::new(MemorySink::new());
    minutely::set_sink(Arc::clone(&sink));

    // The sink handed out is the one installed above.
    minutely::get_sink().unwrap().send_metrics(Vec::new()).unwrap();
    assert_eq!(sink.take(), vec![Vec::new()]);

    // Measure once.
    minutely::begin_measure("my_metric1", &Segments::new());
    thread::sleep(Duration::from_millis(100));
    minutely::end_measure("my_metric1", &Segments::new());

    let values = flush_single(&sink, "my_metric1");
    assert_about(values.average(), 0.1);
    assert_eq!(values.count(), 1);
    assert!(values.segments().is_empty());

    // Measure with segments.
    let segments = Segments::from([("key1", "var1")]);
    minutely::begin_measure("my_metric1", &segments);
    thread::sleep(Duration::from_millis(100));
    minutely::end_measure("my_metric1", &segments);

    let values = flush_single(&sink, "my_metric1");
    assert_eq!(values.segments(), &segments);
    assert_about(values.average(), 0.1);

    // Measure a scope.
    {
        let _timer = minutely::measure("my_metric1", &Segments::new());
        thread::sleep(Duration::from_millis(100));
    }

    let values = flush_single(&sink, "my_metric1");
    assert!(values.segments().is_empty());
    assert_about(values.average(), 0.1);

    // Two measured scopes with segments accumulate into one record.
    minutely::measure_fn("my_metric1", &segments, || {
        thread::sleep(Duration::from_millis(100));
    });
    minutely::measure_fn("my_metric1", &segments, || {
        thread::sleep(Duration::from_millis(100));
    });

    // The two scopes may straddle a minute boundary and land in separate time points.
    minutely::flush().unwrap();

    let payloads = sink.take();
    assert_eq!(payloads.len(), 1);

    let all_values = payloads[0]
        .iter()
        .flat_map(MetricPoints::points)
        .flat_map(|point| point.values())
        .collect::<Vec<_>>();

    assert!(!all_values.is_empty());
    assert_eq!(
        all_values.iter().map(|values| values.count()).sum::<u64>(),
        2
    );

    for values in all_values {
        assert_eq!(values.segments(), &segments);
        assert_about(values.average(), 0.1);
    }

    // Ending a span that was never begun records nothing.
    minutely::end_measure("never_begun", &Segments::new());
    minutely::flush().unwrap();
    assert_eq!(sink.take(), vec![Vec::new()]);
}
