use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::Timestamp;

/// Width of a time bucket. All samples for the same metric and segments that arrive
/// within the same bucket are folded into one set of statistics.
pub const TIME_BUCKET_SECONDS: u64 = 60;

/// How long a collector waits after a flush before the next recorded value triggers
/// another one, unless configured otherwise.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(60);

/// Truncates a wall clock time to the start of its time bucket.
///
/// Times before the Unix epoch all land in bucket zero.
pub(crate) fn time_bucket(now: SystemTime) -> Timestamp {
    let seconds = now
        .duration_since(UNIX_EPOCH)
        .map_or(0, |since_epoch| since_epoch.as_secs());

    truncate_to_bucket(seconds)
}

/// Truncates a Unix time in seconds to the start of its time bucket.
pub(crate) fn truncate_to_bucket(seconds: u64) -> Timestamp {
    seconds
        .checked_rem(TIME_BUCKET_SECONDS)
        .map_or(seconds, |remainder| seconds.wrapping_sub(remainder))
}
