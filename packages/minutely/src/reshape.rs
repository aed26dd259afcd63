use foldhash::{HashMap, HashMapExt};
use serde::Serialize;

use crate::{FlushedRecord, MetricName, Segments, StatSet, Timestamp, Value};

/// The statistics of one segment set within one time bucket of one metric.
///
/// This is a [`FlushedRecord`] without the metric name and timestamp, which the
/// enclosing [`MetricPoints`] and [`TimePoint`] already carry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatRecord {
    segments: Segments,

    #[serde(flatten)]
    stats: StatSet,
}

impl StatRecord {
    pub(crate) fn new(segments: Segments, stats: StatSet) -> Self {
        Self { segments, stats }
    }

    /// Segments the samples were tagged with.
    #[must_use]
    pub fn segments(&self) -> &Segments {
        &self.segments
    }

    /// The statistics themselves.
    #[must_use]
    pub fn stats(&self) -> &StatSet {
        &self.stats
    }

    /// Mean of the samples.
    #[must_use]
    pub fn average(&self) -> Option<Value> {
        self.stats.average()
    }

    /// Smallest sample.
    #[must_use]
    pub fn minimum(&self) -> Option<Value> {
        self.stats.minimum()
    }

    /// Largest sample.
    #[must_use]
    pub fn maximum(&self) -> Option<Value> {
        self.stats.maximum()
    }

    /// Number of samples.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.stats.count()
    }
}

/// All the statistics recorded for one metric within one time bucket.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimePoint {
    time: Timestamp,
    values: Vec<StatRecord>,
}

impl TimePoint {
    /// Start of the time bucket, in Unix seconds.
    #[must_use]
    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// One entry per segment set seen in this time bucket.
    #[must_use]
    pub fn values(&self) -> &[StatRecord] {
        &self.values
    }
}

/// Everything flushed for one metric, grouped by time bucket.
///
/// A flush delivers a sequence of these to the [`Sink`][crate::Sink].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricPoints {
    metric: MetricName,
    points: Vec<TimePoint>,
}

impl MetricPoints {
    /// Name of the metric.
    #[must_use]
    pub fn metric(&self) -> &MetricName {
        &self.metric
    }

    /// One entry per time bucket, in order of first appearance.
    #[must_use]
    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }
}

/// Groups flat records by metric and then by time bucket, ready for delivery to a sink.
///
/// Metrics appear in the order in which their first record appears in the input, as do
/// the time buckets within each metric. Each record keeps its segments and statistics;
/// the metric name and timestamp move up to the enclosing levels.
///
/// # Example
///
/// ```
/// use minutely::{Aggregator, Segments, reshape};
///
/// let mut aggregator = Aggregator::new();
/// aggregator.record_point("request_latency", 0.25, &Segments::new());
/// aggregator.record_point("request_latency", 0.75, &Segments::new());
///
/// let payload = reshape(aggregator.get_and_clear_values());
///
/// assert_eq!(payload.len(), 1);
/// assert_eq!(payload[0].metric(), "request_latency");
/// assert_eq!(payload[0].points()[0].values()[0].count(), 2);
/// ```
#[must_use]
pub fn reshape(records: Vec<FlushedRecord>) -> Vec<MetricPoints> {
    let mut payload: Vec<MetricPoints> = Vec::new();
    let mut metric_index: HashMap<MetricName, usize> = HashMap::new();

    for record in records {
        let (metric, time, values) = record.into_parts();

        let index = *metric_index.entry(metric).or_insert_with_key(|metric| {
            payload.push(MetricPoints {
                metric: metric.clone(),
                points: Vec::new(),
            });
            payload.len().saturating_sub(1)
        });

        let Some(metric_points) = payload.get_mut(index) else {
            unreachable!("every index in the lookup table refers to a pushed entry");
        };

        // There are rarely more than a couple of time buckets per flush, so a scan is enough.
        match metric_points
            .points
            .iter_mut()
            .find(|point| point.time == time)
        {
            Some(point) => point.values.push(values),
            None => metric_points.points.push(TimePoint {
                time,
                values: vec![values],
            }),
        }
    }

    payload
}
