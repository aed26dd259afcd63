//! Per-thread table of timed spans that have begun but not yet ended.
//!
//! Spans never cross threads: a span begun on one thread can only be ended on that same
//! thread. Spans that are never ended stay in the table until the thread exits.

use std::cell::RefCell;
use std::time::Instant;

use foldhash::{HashMap, HashMapExt};

use crate::{MetricName, Segments};

/// Identifies a pending span within the current thread.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub(crate) struct SpanKey {
    /// Two collectors used on the same thread each get their own spans.
    collector_id: u64,
    metric: MetricName,
    segments: Segments,
}

impl SpanKey {
    pub(crate) fn new(collector_id: u64, metric: MetricName, segments: Segments) -> Self {
        Self {
            collector_id,
            metric,
            segments,
        }
    }

    pub(crate) fn metric(&self) -> &MetricName {
        &self.metric
    }

    pub(crate) fn into_parts(self) -> (MetricName, Segments) {
        (self.metric, self.segments)
    }
}

thread_local! {
    static PENDING_SPANS: RefCell<HashMap<SpanKey, Instant>> = RefCell::new(HashMap::new());
}

/// Starts a span on the current thread, replacing any pending span with the same key.
pub(crate) fn begin(key: SpanKey, started: Instant) {
    PENDING_SPANS.with_borrow_mut(|spans| {
        spans.insert(key, started);
    });
}

/// Removes a pending span from the current thread, returning when it started.
pub(crate) fn end(key: &SpanKey) -> Option<Instant> {
    PENDING_SPANS.with_borrow_mut(|spans| spans.remove(key))
}

#[cfg(test)]
pub(crate) fn pending_count() -> usize {
    PENDING_SPANS.with_borrow(|spans| spans.len())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    fn key(collector_id: u64, metric: &'static str) -> SpanKey {
        SpanKey::new(collector_id, metric.into(), Segments::new())
    }

    #[test]
    fn begin_then_end_returns_start() {
        let started = Instant::now();

        begin(key(1, "span_roundtrip"), started);

        assert_eq!(end(&key(1, "span_roundtrip")), Some(started));
        assert_eq!(end(&key(1, "span_roundtrip")), None);
    }

    #[test]
    fn begin_twice_keeps_latest() {
        let first = Instant::now();
        let second = first + Duration::from_millis(10);

        begin(key(1, "span_overwrite"), first);
        begin(key(1, "span_overwrite"), second);

        assert_eq!(end(&key(1, "span_overwrite")), Some(second));
    }

    #[test]
    fn collectors_do_not_share_spans() {
        begin(key(1, "span_shared_name"), Instant::now());

        assert_eq!(end(&key(2, "span_shared_name")), None);
        assert!(end(&key(1, "span_shared_name")).is_some());
    }

    #[test]
    fn segments_are_part_of_the_key() {
        let with_segments = SpanKey::new(1, "span_segments".into(), Segments::from([("k", "v")]));

        begin(with_segments.clone(), Instant::now());

        assert_eq!(end(&key(1, "span_segments")), None);
        assert!(end(&with_segments).is_some());
    }

    #[test]
    fn spans_are_thread_affine() {
        begin(key(1, "span_thread"), Instant::now());

        let seen_elsewhere = thread::spawn(|| (pending_count(), end(&key(1, "span_thread"))))
            .join()
            .unwrap();

        assert_eq!(seen_elsewhere, (0, None));
        assert!(end(&key(1, "span_thread")).is_some());
    }
}
