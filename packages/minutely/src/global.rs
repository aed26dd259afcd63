//! The process-wide collector and the free functions that forward to it.

use std::sync::{Arc, OnceLock};

use crate::error::Result;
use crate::{Collector, Error, MeasureGuard, MetricName, Segments, Sink, Value};

static GLOBAL: OnceLock<Collector> = OnceLock::new();

/// Installs a custom collector as the process-wide collector.
///
/// This must happen before anything else touches the process-wide collector, typically at
/// the start of `main()`. Otherwise a default collector is created on first use.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use minutely::{Collector, TracingSink};
///
/// minutely::install(
///     Collector::builder()
///         .flush_interval(Duration::from_secs(15))
///         .sink(TracingSink)
///         .build(),
/// )
/// .unwrap();
/// ```
///
/// # Errors
///
/// Returns [`Error::GlobalAlreadyInstalled`] if the process-wide collector already exists.
pub fn install(collector: Collector) -> Result<()> {
    GLOBAL
        .set(collector)
        .map_err(|_rejected| Error::GlobalAlreadyInstalled)
}

/// The process-wide collector, created with the default configuration on first use
/// unless one was [installed][install] before that.
pub fn global() -> &'static Collector {
    GLOBAL.get_or_init(Collector::new)
}

/// Installs the sink that receives metrics flushed from the process-wide collector.
///
/// See [`Collector::set_sink()`].
#[cfg_attr(test, mutants::skip)] // Trivial forwarder.
pub fn set_sink(sink: impl Sink + 'static) {
    global().set_sink(sink);
}

/// The sink of the process-wide collector, if any.
///
/// See [`Collector::get_sink()`].
#[cfg_attr(test, mutants::skip)] // Trivial forwarder.
#[must_use]
pub fn get_sink() -> Option<Arc<dyn Sink>> {
    global().get_sink()
}

/// Starts timing a span on the current thread.
///
/// See [`Collector::begin_measure()`].
#[cfg_attr(test, mutants::skip)] // Trivial forwarder.
pub fn begin_measure(metric: impl Into<MetricName>, segments: &Segments) {
    global().begin_measure(metric, segments);
}

/// Ends a span started on the current thread and records its duration in seconds.
///
/// See [`Collector::end_measure()`].
#[cfg_attr(test, mutants::skip)] // Trivial forwarder.
pub fn end_measure(metric: impl Into<MetricName>, segments: &Segments) {
    global().end_measure(metric, segments);
}

/// Records one sample in the process-wide collector.
///
/// See [`Collector::record_value()`].
///
/// # Panics
///
/// Panics if a flush is due and no sink has been installed.
#[cfg_attr(test, mutants::skip)] // Trivial forwarder.
pub fn record_value(metric: impl Into<MetricName>, value: Value, segments: &Segments) {
    global().record_value(metric, value, segments);
}

/// Flushes everything recorded in the process-wide collector to its sink.
///
/// See [`Collector::flush()`].
///
/// # Errors
///
/// Returns [`Error::SinkNotSet`] if no sink is installed and [`Error::Sink`] if the sink
/// fails to accept the payload.
#[cfg_attr(test, mutants::skip)] // Trivial forwarder.
pub fn flush() -> Result<()> {
    global().flush()
}

/// Starts timing a scope, recording the duration when the guard is dropped.
///
/// See [`Collector::measure()`].
#[cfg_attr(test, mutants::skip)] // Trivial forwarder.
pub fn measure(metric: impl Into<MetricName>, segments: &Segments) -> MeasureGuard<'static> {
    global().measure(metric, segments)
}

/// Calls `f` and records how long it took, in seconds.
///
/// See [`Collector::measure_fn()`].
#[cfg_attr(test, mutants::skip)] // Trivial forwarder.
pub fn measure_fn<F, R>(metric: impl Into<MetricName>, segments: &Segments, f: F) -> R
where
    F: FnOnce() -> R,
{
    global().measure_fn(metric, segments, f)
}
