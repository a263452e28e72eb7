//! Wall-clock sources for timers
//!
//! Timers read epoch milliseconds through the `Clock` trait so tests can
//! drive time explicitly with `ManualClock`.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of epoch milliseconds
///
/// Readings are not required to be monotonic. Timers record whatever
/// difference they observe, negative values included.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Clock shared by every timer derived from one invocation
pub type SharedClock = Arc<dyn Clock>;

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Shared handle to the system clock
    pub fn shared() -> SharedClock {
        Arc::new(Self)
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually driven clock
///
/// ```
/// use sluice_metrics::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1000);
/// clock.advance(500);
/// assert_eq!(clock.now_millis(), 1500);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock reading `now` milliseconds
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// Create a shared clock, returning both the concrete and erased handles
    pub fn shared(now: i64) -> (Arc<Self>, SharedClock) {
        let clock = Arc::new(Self::new(now));
        let shared: SharedClock = clock.clone();
        (clock, shared)
    }

    /// Jump to an absolute reading (may go backwards)
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `millis`
    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
