use std::fmt::Debug;
use std::time::{Instant, SystemTime};

/// A source of time that can be replaced for testing.
///
/// Wall clock time decides which time bucket a sample lands in. Monotonic time measures
/// timed spans and the interval between flushes.
pub trait Clock: Debug + Send + Sync {
    /// The current wall clock time.
    fn now(&self) -> SystemTime;

    /// The current monotonic time.
    fn instant(&self) -> Instant;
}

/// The real system clock.
#[derive(Clone, Copy, Debug, Default)]
#[expect(clippy::exhaustive_structs, reason = "stateless clock, constructed by name")]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg_attr(test, mutants::skip)] // Trivial forwarder.
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    #[cfg_attr(test, mutants::skip)] // Trivial forwarder.
    fn instant(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::sync::Arc;
    use std::time::{Duration, UNIX_EPOCH};

    use parking_lot::Mutex;

    use super::*;

    /// Clock for tests that only moves when told to.
    ///
    /// Clones share the same timeline, so a test can keep one handle while
    /// the code under test owns another.
    #[derive(Clone, Debug)]
    pub(crate) struct ManualClock {
        wall_origin: SystemTime,
        monotonic_origin: Instant,
        elapsed: Arc<Mutex<Duration>>,
    }

    impl ManualClock {
        /// Creates a clock whose wall time starts at the given Unix second.
        pub(crate) fn starting_at(unix_seconds: u64) -> Self {
            Self {
                wall_origin: UNIX_EPOCH + Duration::from_secs(unix_seconds),
                monotonic_origin: Instant::now(),
                elapsed: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }

        pub(crate) fn advance(&self, by: Duration) {
            let mut elapsed = self.elapsed.lock();
            *elapsed = elapsed.saturating_add(by);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> SystemTime {
            self.wall_origin + *self.elapsed.lock()
        }

        fn instant(&self) -> Instant {
            self.monotonic_origin + *self.elapsed.lock()
        }
    }
}
