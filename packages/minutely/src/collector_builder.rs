use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Duration;

use crate::{Clock, Collector, DEFAULT_FLUSH_INTERVAL, Sink, SystemClock};

/// Creates instances of [`Collector`].
///
/// All parameters are optional. Use `Collector::builder()` to create a new instance of
/// this builder.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use minutely::{Collector, TracingSink};
///
/// let collector = Collector::builder()
///     .flush_interval(Duration::from_secs(30))
///     .sink(TracingSink)
///     .build();
/// ```
#[must_use]
pub struct CollectorBuilder {
    flush_interval: Duration,
    sink: Option<Arc<dyn Sink>>,
    clock: Arc<dyn Clock>,
}

impl CollectorBuilder {
    pub(crate) fn new() -> Self {
        Self {
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            sink: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets the minimum time between flushes.
    ///
    /// Once this much time has passed since the previous flush, the next recorded value
    /// triggers a flush on the recording thread. Flushes are driven by recording activity,
    /// so a collector that records nothing never flushes on its own, however long the
    /// interval has been exceeded.
    ///
    /// Defaults to [`DEFAULT_FLUSH_INTERVAL`].
    pub fn flush_interval(self, flush_interval: Duration) -> Self {
        Self {
            flush_interval,
            ..self
        }
    }

    /// Sets the sink that receives flushed metrics.
    ///
    /// A sink can also be installed later via [`Collector::set_sink()`]. One must be
    /// installed before the first flush.
    pub fn sink(self, sink: impl Sink + 'static) -> Self {
        Self {
            sink: Some(Arc::new(sink)),
            ..self
        }
    }

    /// Sets the source of time. Defaults to [`SystemClock`].
    pub fn clock(self, clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
            ..self
        }
    }

    /// Creates the collector.
    #[must_use]
    pub fn build(self) -> Collector {
        Collector::new_inner(self.flush_interval, self.sink, self.clock)
    }
}

impl Debug for CollectorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorBuilder")
            .field("flush_interval", &self.flush_interval)
            .field("sink", &self.sink.as_ref().map(|_| "<sink>"))
            .field("clock", &self.clock)
            .finish()
    }
}
