use std::mem;
use std::time::{Duration, Instant};

use crate::{Collector, MetricName, Segments};

/// Times a scope and records its duration, in seconds, when dropped.
///
/// Created by [`Collector::measure()`] or the process-wide [`measure()`][crate::measure].
/// The duration is recorded on every exit path, including early returns and panics.
#[derive(Debug)]
#[must_use = "the measurement ends when the guard is dropped"]
pub struct MeasureGuard<'a> {
    collector: &'a Collector,
    metric: MetricName,
    segments: Segments,
    started: Instant,
}

impl<'a> MeasureGuard<'a> {
    pub(crate) fn new(
        collector: &'a Collector,
        metric: MetricName,
        segments: Segments,
        started: Instant,
    ) -> Self {
        Self {
            collector,
            metric,
            segments,
            started,
        }
    }

    /// Time elapsed since the guard was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.collector.now().saturating_duration_since(self.started)
    }
}

impl Drop for MeasureGuard<'_> {
    fn drop(&mut self) {
        let elapsed = self.elapsed();

        self.collector.record_value(
            mem::take(&mut self.metric),
            elapsed.as_secs_f64(),
            &mem::take(&mut self.segments),
        );
    }
}
