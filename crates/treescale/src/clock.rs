//! Timing sources for measurements.
//!
//! Measurements read time through [`Clock`] so tests can substitute a
//! [`FakeClock`] that only moves when told to. [`MemoryEnvironment`] can
//! charge simulated costs to the same fake clock, which makes complete degree
//! checks deterministic.
//!
//! [`MemoryEnvironment`]: crate::memory::MemoryEnvironment

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source
pub trait Clock: fmt::Debug {
    /// Time since an arbitrary fixed origin; never decreases
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is now
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock
///
/// Clones share the same time, so the environment charging costs and the
/// harness reading them observe one timeline.
#[derive(Debug, Clone, Default)]
pub struct FakeClock {
    nanos: Arc<AtomicU64>,
}

impl FakeClock {
    /// Create a clock at time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by a duration
    pub fn advance(&self, duration: Duration) {
        self.advance_nanos(duration.as_nanos() as u64);
    }

    /// Advance by nanoseconds
    pub fn advance_nanos(&self, nanos: u64) {
        self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Set an absolute time
    ///
    /// Moving backwards is ignored; the clock stays monotonic.
    pub fn set(&self, time: Duration) {
        self.nanos
            .fetch_max(time.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Current time in nanoseconds
    #[must_use]
    pub fn now_nanos(&self) -> u64 {
        self.nanos.load(Ordering::SeqCst)
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.now_nanos())
    }
}
