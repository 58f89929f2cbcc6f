//! The fixed-period control loop (§4.1).
//!
//! Mirrors `evo_control_unit::cycle::CycleRunner`: an absolute-deadline
//! accumulator with a spin-wait tail on real hardware, a plain
//! `thread::sleep` loop in simulation/test builds, and an O(1) running
//! `TickStats` (min/max/avg/overrun count) alongside it. Runs on a
//! dedicated `std::thread`, not a tokio task — see `SPEC_FULL.md` §F.

use std::time::{Duration, Instant};

/// One cycle's worth of work: read feedback, verify, multiplex, send,
/// publish. Implemented by `core::ControllerInner::tick` in this crate;
/// kept as a trait here so `CycleRunner` (and its tests) don't need to know
/// about the controller's internals.
pub trait CycleBody: Send {
    fn run_tick(&mut self);
}

/// O(1) running tick-duration statistics (§ SPEC_FULL.md G).
#[derive(Debug, Clone, Copy, Default)]
pub struct TickStats {
    count: u64,
    sum_ns: u128,
    min_ns: u64,
    max_ns: u64,
    overruns: u64,
}

impl TickStats {
    pub fn record(&mut self, duration: Duration, period: Duration) {
        let ns = duration.as_nanos() as u64;
        self.count += 1;
        self.sum_ns += ns as u128;
        self.min_ns = if self.count == 1 { ns } else { self.min_ns.min(ns) };
        self.max_ns = self.max_ns.max(ns);
        if duration > period {
            self.overruns += 1;
        }
    }

    pub fn avg_ns(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            (self.sum_ns / self.count as u128) as u64
        }
    }

    pub fn min_ns(&self) -> u64 {
        self.min_ns
    }
    pub fn max_ns(&self) -> u64 {
        self.max_ns
    }
    pub fn overruns(&self) -> u64 {
        self.overruns
    }
    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Drives a [`CycleBody`] at a fixed period until told to stop.
pub struct CycleRunner {
    period: Duration,
    stats: TickStats,
}

impl CycleRunner {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            stats: TickStats::default(),
        }
    }

    pub fn stats(&self) -> TickStats {
        self.stats
    }

    /// Run `body` once per period until `should_stop` returns `true`.
    ///
    /// Uses `Instant`-based absolute deadlines (teacher's
    /// `clock_gettime`/`clock_nanosleep(TIMER_ABSTIME)` pattern, portably
    /// expressed over `std::thread::sleep` — the `rt` feature is what adds
    /// the real-time scheduling guarantees on Linux, not a different
    /// timing algorithm).
    pub fn run(&mut self, mut body: impl CycleBody, mut should_stop: impl FnMut() -> bool) {
        let mut deadline = Instant::now();
        while !should_stop() {
            deadline += self.period;

            let started = Instant::now();
            body.run_tick();
            self.stats.record(started.elapsed(), self.period);

            let now = Instant::now();
            if deadline > now {
                std::thread::sleep(deadline - now);
            } else {
                // Missed the deadline; resync instead of free-running.
                deadline = now;
            }
        }
    }
}

#[cfg(feature = "rt")]
pub fn rt_setup() -> Result<(), String> {
    use nix::sys::mman::{mlockall, MlockAllFlags};
    mlockall(MlockAllFlags::MCL_CURRENT | MlockAllFlags::MCL_FUTURE)
        .map_err(|e| format!("mlockall failed: {e}"))?;
    // SCHED_FIFO / affinity setup intentionally left to the deployment's
    // own init sequence (cpuset, isolcpus) rather than hardcoded here.
    Ok(())
}

#[cfg(not(feature = "rt"))]
pub fn rt_setup() -> Result<(), String> {
    Ok(())
}
