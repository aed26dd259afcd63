//! Example that demonstrates typical usage of the process-wide collector.
//!
//! The flushed statistics are captured in memory and printed to the terminal.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use minutely::{MemorySink, Segments};

fn main() {
    println!("=== minutely README Example ===");

    let sink = Arc::new(MemorySink::new());
    minutely::set_sink(Arc::clone(&sink));

    let segments = Segments::from([("endpoint", "/orders")]);

    // Timed span, begun and ended on the same thread.
    minutely::begin_measure("order_processing_duration", &segments);
    thread::sleep(Duration::from_millis(20));
    minutely::end_measure("order_processing_duration", &segments);

    // Scoped timing.
    minutely::measure_fn("order_persist_duration", &segments, || {
        thread::sleep(Duration::from_millis(5));
    });

    // Plain values.
    for total in [19.99, 49.95, 5.00] {
        minutely::record_value("order_total_eur", total, &segments);
    }

    minutely::flush().expect("a sink was installed above");

    for payload in sink.take() {
        for metric in payload {
            for point in metric.points() {
                for values in point.values() {
                    println!(
                        "{} @ {} {:?}: avg {:?} min {:?} max {:?} count {}",
                        metric.metric(),
                        point.time(),
                        values.segments(),
                        values.average(),
                        values.minimum(),
                        values.maximum(),
                        values.count()
                    );
                }
            }
        }
    }

    println!("README example completed successfully!");
}
