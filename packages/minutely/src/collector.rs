use std::fmt::{self, Debug};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, trace, warn};

use crate::error::Result;
use crate::spans::{self, SpanKey};
use crate::{
    Aggregator, Clock, CollectorBuilder, Error, FlushedRecord, MeasureGuard, MetricName,
    Segments, Sink, Value, reshape,
};

/// Distinguishes the pending spans of different collectors on the same thread.
static NEXT_COLLECTOR_ID: AtomicU64 = AtomicU64::new(0);

/// Records metric samples from any number of threads and periodically flushes the
/// aggregated statistics to a [`Sink`].
///
/// Samples are folded into per-minute statistics (see [`Aggregator`]). Whenever a value is
/// recorded and at least the [flush interval][CollectorBuilder::flush_interval] has passed
/// since the previous flush, the recording thread flushes: it extracts everything
/// accumulated so far, reshapes it and hands it to the sink.
///
/// Most processes use the process-wide collector through the free functions at the crate
/// root ([`record_value()`][crate::record_value] and friends). Create your own instance when
/// you want an isolated set of metrics, for example in tests.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use minutely::{Collector, MemorySink, Segments};
///
/// let sink = Arc::new(MemorySink::new());
/// let collector = Collector::builder().sink(Arc::clone(&sink)).build();
///
/// let segments = Segments::from([("endpoint", "/users")]);
///
/// collector.begin_measure("request_duration", &segments);
/// // ... handle the request ...
/// collector.end_measure("request_duration", &segments);
///
/// collector.record_value("response_bytes", 5120.0, &segments);
///
/// collector.flush().unwrap();
/// assert_eq!(sink.payloads()[0].len(), 2);
/// ```
///
/// # Thread safety
///
/// All recording and extraction happens under one lock, so every sample ends up in
/// exactly one flush. The sink is called after the lock is released, so a slow sink
/// does not block other threads from recording.
///
/// Timed spans started via [`begin_measure()`][Self::begin_measure] belong to the thread
/// that started them and can only be ended on that same thread.
pub struct Collector {
    id: u64,
    flush_interval: Duration,
    clock: Arc<dyn Clock>,
    sink: RwLock<Option<Arc<dyn Sink>>>,
    state: Mutex<CollectorState>,
}

struct CollectorState {
    aggregator: Aggregator,
    last_flush: Instant,
}

impl CollectorState {
    /// Starts a new flush epoch, handing over everything recorded in the previous one.
    fn take_records(&mut self, now: Instant) -> Vec<FlushedRecord> {
        self.last_flush = now;
        self.aggregator.get_and_clear_values()
    }
}

impl Collector {
    /// Creates a new collector builder with the default builder configuration.
    #[cfg_attr(test, mutants::skip)] // Gets replaced with itself by different name, bad mutation.
    pub fn builder() -> CollectorBuilder {
        CollectorBuilder::new()
    }

    /// Creates a collector with the default configuration and no sink.
    ///
    /// A sink must be installed via [`set_sink()`][Self::set_sink] before the first flush.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub(crate) fn new_inner(
        flush_interval: Duration,
        sink: Option<Arc<dyn Sink>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let last_flush = clock.instant();

        Self {
            id: NEXT_COLLECTOR_ID.fetch_add(1, Ordering::Relaxed),
            flush_interval,
            sink: RwLock::new(sink),
            state: Mutex::new(CollectorState {
                aggregator: Aggregator::with_clock(Arc::clone(&clock)),
                last_flush,
            }),
            clock,
        }
    }

    /// The minimum time between flushes.
    #[must_use]
    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    /// Installs the sink that receives flushed metrics, replacing any previous one.
    pub fn set_sink(&self, sink: impl Sink + 'static) {
        *self.sink.write() = Some(Arc::new(sink));
    }

    /// The currently installed sink, if any.
    #[must_use]
    pub fn get_sink(&self) -> Option<Arc<dyn Sink>> {
        self.sink.read().clone()
    }

    /// Starts timing a span on the current thread.
    ///
    /// The span is identified by the metric name and segments. If a span with the same
    /// identity is already pending on this thread, it is replaced.
    pub fn begin_measure(&self, metric: impl Into<MetricName>, segments: &Segments) {
        let key = SpanKey::new(self.id, metric.into(), segments.clone());
        spans::begin(key, self.clock.instant());
    }

    /// Ends a span started on the current thread and records its duration in seconds.
    ///
    /// Does nothing if no matching span is pending on this thread, for example if the
    /// span was never started, was already ended or was started on a different thread.
    pub fn end_measure(&self, metric: impl Into<MetricName>, segments: &Segments) {
        let key = SpanKey::new(self.id, metric.into(), segments.clone());

        let Some(started) = spans::end(&key) else {
            trace!(
                metric = %key.metric(),
                "ignoring end of a span that is not pending on this thread"
            );
            return;
        };

        let elapsed = self.clock.instant().saturating_duration_since(started);
        let (metric, segments) = key.into_parts();

        self.record_value(metric, elapsed.as_secs_f64(), &segments);
    }

    /// Records one sample.
    ///
    /// If the flush interval has passed since the previous flush, this thread flushes
    /// before returning.
    ///
    /// # Panics
    ///
    /// Panics if a flush is due and no sink has been installed. The recorded data stays in
    /// the collector and is delivered by the first flush after a sink is installed.
    ///
    /// Failures reported by the sink itself do not panic; they are logged and the flushed
    /// data is dropped.
    pub fn record_value(&self, metric: impl Into<MetricName>, value: Value, segments: &Segments) {
        let due_flush = {
            let mut state = self.state.lock();
            state.aggregator.record_point(metric, value, segments);

            let now = self.clock.instant();

            if now.saturating_duration_since(state.last_flush) < self.flush_interval {
                return;
            }

            // Without a sink nothing is extracted, so the data survives until one is installed.
            self.get_sink().map(|sink| (sink, state.take_records(now)))
        };

        let outcome = match due_flush {
            Some((sink, records)) => send(sink.as_ref(), records),
            None => Err(Error::SinkNotSet),
        };

        if let Err(error) = outcome {
            report_background_flush_failure(error);
        }
    }

    /// Flushes everything recorded so far to the sink, whether or not the flush
    /// interval has passed.
    ///
    /// The sink is called even if nothing has been recorded, with an empty payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SinkNotSet`] if no sink is installed. In this case nothing is
    /// extracted and the accumulated data remains in the collector.
    ///
    /// Returns [`Error::Sink`] if the sink fails to accept the payload. The payload
    /// is dropped.
    pub fn flush(&self) -> Result<()> {
        let sink = self.get_sink().ok_or(Error::SinkNotSet)?;

        let now = self.clock.instant();
        let records = self.state.lock().take_records(now);

        send(sink.as_ref(), records)
    }

    /// Starts timing a scope. The duration is recorded in seconds when the returned guard
    /// is dropped, including when the scope is exited by a panic.
    ///
    /// Unlike [`begin_measure()`][Self::begin_measure], the guard carries its own start
    /// time and does not use the per-thread span table.
    ///
    /// # Example
    ///
    /// ```
    /// use minutely::{Collector, Segments};
    ///
    /// let collector = Collector::new();
    ///
    /// {
    ///     let _timer = collector.measure("cache_rebuild", &Segments::new());
    ///     // ... rebuild the cache ...
    /// }
    /// ```
    pub fn measure(&self, metric: impl Into<MetricName>, segments: &Segments) -> MeasureGuard<'_> {
        MeasureGuard::new(self, metric.into(), segments.clone(), self.clock.instant())
    }

    /// Calls `f` and records how long it took, in seconds.
    ///
    /// # Example
    ///
    /// ```
    /// use minutely::{Collector, Segments};
    ///
    /// let collector = Collector::new();
    ///
    /// let sum = collector.measure_fn("sum_duration", &Segments::new(), || 2 + 2);
    /// assert_eq!(sum, 4);
    /// ```
    pub fn measure_fn<F, R>(&self, metric: impl Into<MetricName>, segments: &Segments, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = self.measure(metric, segments);
        f()
    }

    pub(crate) fn now(&self) -> Instant {
        self.clock.instant()
    }
}

fn send(sink: &dyn Sink, records: Vec<FlushedRecord>) -> Result<()> {
    let record_count = records.len();
    let payload = reshape(records);

    debug!(
        records = record_count,
        metrics = payload.len(),
        "flushing metrics"
    );

    sink.send_metrics(payload).map_err(Error::Sink)
}

fn report_background_flush_failure(error: Error) {
    if let Error::Sink(source) = error {
        warn!(
            error = %source,
            "metrics sink rejected a flush, the flushed metrics were dropped"
        );
    } else if thread::panicking() {
        error!(
            %error,
            "metrics flush is due but cannot be delivered while unwinding, metrics remain buffered"
        );
    } else {
        panic!("a metrics flush is due but cannot be delivered: {error}");
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Collector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector")
            .field("id", &self.id)
            .field("flush_interval", &self.flush_interval)
            .field("clock", &self.clock)
            .field("has_sink", &self.sink.read().is_some())
            .finish_non_exhaustive()
    }
}
