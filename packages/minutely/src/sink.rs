use std::error::Error as StdError;
use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::MetricPoints;

/// Error reported by a [`Sink`] that could not accept a payload.
pub type SinkError = Box<dyn StdError + Send + Sync>;

/// Receives flushed metrics and delivers them to wherever they need to go.
///
/// A sink is called synchronously by whichever thread performs a flush, outside
/// the collector's lock. Delivery is best-effort: the collector does not retry or
/// requeue a payload that the sink fails to accept.
///
/// # Example
///
/// ```
/// use minutely::{Collector, MetricPoints, Sink, SinkError};
///
/// struct StdoutSink;
///
/// impl Sink for StdoutSink {
///     fn send_metrics(&self, payload: Vec<MetricPoints>) -> Result<(), SinkError> {
///         println!("flushed {} metrics", payload.len());
///         Ok(())
///     }
/// }
///
/// let collector = Collector::new();
/// collector.set_sink(StdoutSink);
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait Sink: Send + Sync {
    /// Delivers one flush worth of metrics.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload could not be delivered. The payload is lost.
    fn send_metrics(&self, payload: Vec<MetricPoints>) -> Result<(), SinkError>;
}

impl<S> Sink for Arc<S>
where
    S: Sink + ?Sized,
{
    #[cfg_attr(test, mutants::skip)] // Trivial forwarder.
    fn send_metrics(&self, payload: Vec<MetricPoints>) -> Result<(), SinkError> {
        (**self).send_metrics(payload)
    }
}

/// A sink that keeps every payload in memory.
///
/// Useful in tests and for processes that want to inspect their own metrics.
/// Nothing is ever evicted, so call [`take()`][Self::take] regularly if the sink
/// lives for long.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use minutely::{Collector, MemorySink, Segments};
///
/// let sink = Arc::new(MemorySink::new());
///
/// let collector = Collector::builder().sink(Arc::clone(&sink)).build();
/// collector.record_value("queue_depth", 12.0, &Segments::new());
/// collector.flush().unwrap();
///
/// assert_eq!(sink.len(), 1);
/// assert_eq!(sink.payloads()[0][0].metric(), "queue_depth");
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    payloads: Mutex<Vec<Vec<MetricPoints>>>,
}

impl MemorySink {
    /// Creates an empty memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of all payloads received so far, oldest first.
    #[must_use]
    pub fn payloads(&self) -> Vec<Vec<MetricPoints>> {
        self.payloads.lock().clone()
    }

    /// Removes and returns all payloads received so far, oldest first.
    #[must_use]
    pub fn take(&self) -> Vec<Vec<MetricPoints>> {
        mem::take(&mut *self.payloads.lock())
    }

    /// Number of payloads received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payloads.lock().len()
    }

    /// Whether no payloads have been received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payloads.lock().is_empty()
    }
}

impl Sink for MemorySink {
    fn send_metrics(&self, payload: Vec<MetricPoints>) -> Result<(), SinkError> {
        self.payloads.lock().push(payload);
        Ok(())
    }
}

/// A sink that writes every flushed statistic to the `tracing` log at `info` level.
///
/// One event is emitted per metric, time bucket and segment set.
#[derive(Clone, Copy, Debug, Default)]
#[expect(clippy::exhaustive_structs, reason = "stateless sink, constructed by name")]
pub struct TracingSink;

impl Sink for TracingSink {
    fn send_metrics(&self, payload: Vec<MetricPoints>) -> Result<(), SinkError> {
        for metric in &payload {
            for point in metric.points() {
                for values in point.values() {
                    tracing::info!(
                        metric = %metric.metric(),
                        time = point.time(),
                        segments = ?values.segments(),
                        average = values.average(),
                        minimum = values.minimum(),
                        maximum = values.maximum(),
                        count = values.count(),
                        "metric flushed"
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::{Aggregator, Segments, reshape};

    assert_impl_all!(MemorySink: Sink, Send, Sync);
    assert_impl_all!(TracingSink: Sink, Send, Sync);

    fn sample_payload() -> Vec<MetricPoints> {
        let mut aggregator = Aggregator::new();
        aggregator.record_point("metric1", 1.0, &Segments::new());
        reshape(aggregator.get_and_clear_values())
    }

    #[test]
    fn memory_sink_keeps_payloads_in_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.send_metrics(sample_payload()).unwrap();
        sink.send_metrics(Vec::new()).unwrap();

        let payloads = sink.payloads();
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads.first().map(Vec::len), Some(1));
        assert_eq!(payloads.get(1).map(Vec::len), Some(0));

        // payloads() does not consume anything.
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn memory_sink_take_empties() {
        let sink = MemorySink::new();
        sink.send_metrics(sample_payload()).unwrap();

        assert_eq!(sink.take().len(), 1);
        assert!(sink.is_empty());
        assert!(sink.take().is_empty());
    }

    #[test]
    fn arc_forwards_to_inner_sink() {
        let inner = Arc::new(MemorySink::new());
        let outer: Arc<dyn Sink> = Arc::new(Arc::clone(&inner));

        outer.send_metrics(sample_payload()).unwrap();

        assert_eq!(inner.len(), 1);
    }

    #[test]
    fn tracing_sink_accepts_payload() {
        TracingSink.send_metrics(sample_payload()).unwrap();
    }

    #[test]
    fn mock_sink_receives_payload() {
        let mut sink = MockSink::new();
        sink.expect_send_metrics()
            .withf(|payload| payload.len() == 1)
            .times(1)
            .returning(|_| Ok(()));

        sink.send_metrics(sample_payload()).unwrap();
    }
}
