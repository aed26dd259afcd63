use std::mem;
use std::sync::Arc;

use foldhash::{HashMap, HashMapExt};
use serde::Serialize;

use crate::{
    Clock, MetricName, Segments, StatRecord, StatSet, SystemClock, Timestamp, Value, time_bucket,
    truncate_to_bucket,
};

/// Identifies the statistics that a sample is folded into.
///
/// Ordering is by time bucket first, then metric name, then segments.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AggregationKey {
    timestamp: Timestamp,
    metric: MetricName,
    segments: Segments,
}

impl AggregationKey {
    /// Creates a key for the time bucket that `timestamp` falls into.
    #[must_use]
    pub fn new(timestamp: Timestamp, metric: impl Into<MetricName>, segments: Segments) -> Self {
        Self {
            timestamp: truncate_to_bucket(timestamp),
            metric: metric.into(),
            segments,
        }
    }

    /// Start of the time bucket, in Unix seconds.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Name of the metric.
    #[must_use]
    pub fn metric(&self) -> &MetricName {
        &self.metric
    }

    /// Segments the samples were tagged with.
    #[must_use]
    pub fn segments(&self) -> &Segments {
        &self.segments
    }
}

/// Accumulates samples into per-minute statistics until they are extracted.
///
/// Every distinct combination of time bucket, metric name and segment set gets its own
/// [`StatSet`]. Extraction via [`get_and_clear_values()`][Self::get_and_clear_values]
/// hands over everything accumulated so far and starts a fresh epoch.
///
/// The aggregator itself is not synchronized. In a multithreaded process, wrap it in a lock;
/// [`Collector`][crate::Collector] does exactly that, holding one lock for the duration of
/// each recording and each extraction so that every sample lands in exactly one epoch.
#[derive(Debug)]
pub struct Aggregator {
    clock: Arc<dyn Clock>,
    points: HashMap<AggregationKey, StatSet>,
}

impl Aggregator {
    /// Creates an empty aggregator that assigns time buckets using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty aggregator that assigns time buckets using the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            points: HashMap::new(),
        }
    }

    /// Records one sample in the time bucket of the current wall clock time.
    pub fn record_point(&mut self, metric: impl Into<MetricName>, value: Value, segments: &Segments) {
        let timestamp = time_bucket(self.clock.now());
        self.record_point_at(timestamp, metric, value, segments);
    }

    /// Records one sample in the time bucket that `timestamp` falls into.
    pub fn record_point_at(
        &mut self,
        timestamp: Timestamp,
        metric: impl Into<MetricName>,
        value: Value,
        segments: &Segments,
    ) {
        let key = AggregationKey::new(timestamp, metric, segments.clone());

        self.points.entry(key).or_default().update(value);
    }

    /// Extracts all accumulated statistics and leaves the aggregator empty.
    ///
    /// Records are sorted by time bucket, then metric name, then segments.
    #[must_use]
    pub fn get_and_clear_values(&mut self) -> Vec<FlushedRecord> {
        into_sorted_records(mem::take(&mut self.points).into_iter())
    }

    /// Returns a copy of the accumulated statistics without clearing them.
    ///
    /// Records are sorted by time bucket, then metric name, then segments.
    #[must_use]
    pub fn get_values(&self) -> Vec<FlushedRecord> {
        into_sorted_records(
            self.points
                .iter()
                .map(|(key, stats)| (key.clone(), stats.clone())),
        )
    }

    /// Number of distinct statistics currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether nothing has been recorded since the last extraction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

fn into_sorted_records(
    points: impl Iterator<Item = (AggregationKey, StatSet)>,
) -> Vec<FlushedRecord> {
    let mut points = points.collect::<Vec<_>>();
    points.sort_by(|(a, _), (b, _)| a.cmp(b));

    points
        .into_iter()
        .map(|(key, stats)| FlushedRecord::new(key, stats))
        .collect()
}

/// A snapshot of the statistics for one metric, segment set and time bucket.
///
/// Once extracted from an [`Aggregator`], a record is detached from it and never changes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlushedRecord {
    metric: MetricName,
    timestamp: Timestamp,

    #[serde(flatten)]
    values: StatRecord,
}

impl FlushedRecord {
    pub(crate) fn new(key: AggregationKey, stats: StatSet) -> Self {
        Self {
            metric: key.metric,
            timestamp: key.timestamp,
            values: StatRecord::new(key.segments, stats),
        }
    }

    /// Name of the metric.
    #[must_use]
    pub fn metric(&self) -> &MetricName {
        &self.metric
    }

    /// Start of the time bucket, in Unix seconds.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Segments the samples were tagged with.
    #[must_use]
    pub fn segments(&self) -> &Segments {
        self.values.segments()
    }

    /// Mean of the samples.
    #[must_use]
    pub fn average(&self) -> Option<Value> {
        self.values.average()
    }

    /// Smallest sample.
    #[must_use]
    pub fn minimum(&self) -> Option<Value> {
        self.values.minimum()
    }

    /// Largest sample.
    #[must_use]
    pub fn maximum(&self) -> Option<Value> {
        self.values.maximum()
    }

    /// Number of samples.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.values.count()
    }

    /// Splits the record into its metric name, time bucket and the remaining statistics.
    #[must_use]
    pub fn into_parts(self) -> (MetricName, Timestamp, StatRecord) {
        (self.metric, self.timestamp, self.values)
    }
}
