use std::borrow::Cow;

/// The magnitude of a single sample.
///
/// Timed spans record elapsed wall time in seconds, so fractional values are the norm.
pub type Value = f64;

/// The name of a metric, used for display and keying purposes.
///
/// Typically metric names are `&'static str` but for rare cases when the exact
/// set of metrics is not known in advance, we also support owned strings via `Cow`.
pub type MetricName = Cow<'static, str>;

/// Unix time in whole seconds.
///
/// Timestamps attached to flushed data are always truncated to the start of
/// their time bucket (see [`TIME_BUCKET_SECONDS`][crate::TIME_BUCKET_SECONDS]).
pub type Timestamp = u64;
