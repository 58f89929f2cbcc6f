//! Monotonic millisecond clock (§2 `Clock`).
//!
//! A thin seam over `std::time::Instant` so the control loop and its tests
//! can share one notion of "now" without either depending on wall-clock
//! time. Mirrors the teacher's habit (`evo_control_unit::cycle`) of
//! isolating `clock_gettime`-equivalent calls behind a narrow helper.

use std::time::Instant;

/// Monotonic millisecond timestamp source.
pub trait Clock: Send + Sync {
    /// Milliseconds since an arbitrary, fixed epoch (process start).
    fn now_ms(&self) -> i64;
}

/// Real wall-clock-independent monotonic clock backed by `Instant`.
#[derive(Debug)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> i64 {
        self.epoch.elapsed().as_millis() as i64
    }
}

/// A clock that only advances when told to — used by tests that need
/// deterministic control over `verify_communication`/jog-timeout/trajectory
/// timing without real sleeps.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: parking_lot::Mutex<i64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: parking_lot::Mutex::new(start_ms),
        }
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        *self.now_ms.lock() += delta_ms;
    }

    pub fn set_ms(&self, value_ms: i64) {
        *self.now_ms.lock() = value_ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        *self.now_ms.lock()
    }
}
