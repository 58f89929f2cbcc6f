//! Named interfaces to every external collaborator (§1, §6).
//!
//! The core never talks to hardware, an interpolator implementation, or an
//! RPC node directly — only through these traits. Concrete implementations
//! live outside this crate.

use async_trait::async_trait;
use robocore_common::wire::ClientEndpointId;

/// The concrete transport that moves joint commands to hardware and
/// reports feedback (§6 "Transport contract").
///
/// Feedback ingress (updating `RobotFeedback`, §6) is not part of this
/// trait: the transport owns a handle to the controller's feedback slot
/// and writes it directly (allocate-then-swap, §5), the same way the
/// teacher's HAL segment reader writes into `AxisRuntimeState` each cycle.
#[async_trait]
pub trait RobotTransport: Send + Sync {
    /// Best-effort, non-blocking command send (§4.1, §6).
    ///
    /// At most one of `pos_cmd`/`vel_cmd` is `Some`. Implementations must
    /// not block the caller; failures are swallowed by the core into a
    /// dropped-command sink and retried next tick (§7).
    async fn send_robot_command(&self, now_ms: i64, pos_cmd: Option<&[f64]>, vel_cmd: Option<&[f64]>);

    /// Request the drive be disabled. Returns once the request has been
    /// issued, not once it has taken effect (§6).
    async fn send_disable(&self);

    /// Request the drive be enabled.
    async fn send_enable(&self);

    /// Request controller errors be reset.
    async fn send_reset_errors(&self);
}

/// A loaded trajectory evaluator (§6 "Interpolator contract").
///
/// One instance per `TrajectoryTask`, built off the control-loop's
/// critical path by `execute_trajectory` (§4.6 step 2).
pub trait TrajectoryInterpolator: Send + Sync {
    /// Evaluate joint setpoints at time `t` seconds since trajectory start.
    ///
    /// Returns `(joint_positions[N], waypoint_index)`.
    fn interpolate(&self, t_seconds: f64) -> (Vec<f64>, usize);

    /// Total trajectory duration, in seconds.
    fn max_time(&self) -> f64;
}

/// Builds a loaded [`TrajectoryInterpolator`] from a trajectory definition
/// and the current speed ratio (§6: `LoadTrajectory(waypoints, speed_ratio)`).
///
/// Kept as its own trait (rather than folding into `TrajectoryInterpolator`)
/// because `execute_trajectory` builds the interpolator *before* acquiring
/// the controller lock (§4.6 step 2) — the builder has no access to
/// controller state, only to whatever waypoint payload the caller supplies.
pub trait TrajectoryLoader: Send + Sync {
    /// Opaque trajectory definition type, supplied by the caller of
    /// `execute_trajectory` and otherwise uninterpreted by the core.
    type Definition;

    fn load(
        &self,
        trajectory: &Self::Definition,
        speed_ratio: f64,
    ) -> Box<dyn TrajectoryInterpolator>;
}

/// Liveness check for a client endpoint (§4.5: "a liveness watcher polls
/// the owning client endpoint every 50 ms").
///
/// Stands in for the source's reach into a process-wide RPC-node singleton
/// (spec §9 design note): this capability is injected at construction
/// instead.
#[async_trait]
pub trait EndpointHealth: Send + Sync {
    /// True if `endpoint` is still reachable.
    async fn is_connected(&self, endpoint: ClientEndpointId) -> bool;
}

#[cfg(test)]
pub(crate) mod test_doubles {
    use super::*;
    use parking_lot::Mutex;

    /// Records every command sent; never fails.
    #[derive(Default)]
    pub struct RecordingTransport {
        pub sent: Mutex<Vec<(i64, Option<Vec<f64>>, Option<Vec<f64>>)>>,
        pub disables: Mutex<u32>,
        pub enables: Mutex<u32>,
        pub resets: Mutex<u32>,
    }

    #[async_trait]
    impl RobotTransport for RecordingTransport {
        async fn send_robot_command(
            &self,
            now_ms: i64,
            pos_cmd: Option<&[f64]>,
            vel_cmd: Option<&[f64]>,
        ) {
            self.sent.lock().push((
                now_ms,
                pos_cmd.map(|s| s.to_vec()),
                vel_cmd.map(|s| s.to_vec()),
            ));
        }

        async fn send_disable(&self) {
            *self.disables.lock() += 1;
        }

        async fn send_enable(&self) {
            *self.enables.lock() += 1;
        }

        async fn send_reset_errors(&self) {
            *self.resets.lock() += 1;
        }
    }

    /// Always reports every endpoint as connected.
    pub struct AlwaysConnected;

    #[async_trait]
    impl EndpointHealth for AlwaysConnected {
        async fn is_connected(&self, _endpoint: ClientEndpointId) -> bool {
            true
        }
    }

    /// Reports every endpoint as disconnected (for connection-loss tests).
    pub struct NeverConnected;

    #[async_trait]
    impl EndpointHealth for NeverConnected {
        async fn is_connected(&self, _endpoint: ClientEndpointId) -> bool {
            false
        }
    }

    /// A trivial linear interpolator used by trajectory tests: moves from
    /// `start` to `end` over `duration_s` seconds.
    pub struct LinearInterpolator {
        pub start: Vec<f64>,
        pub end: Vec<f64>,
        pub duration_s: f64,
    }

    impl TrajectoryInterpolator for LinearInterpolator {
        fn interpolate(&self, t_seconds: f64) -> (Vec<f64>, usize) {
            let frac = (t_seconds / self.duration_s).clamp(0.0, 1.0);
            let pos = self
                .start
                .iter()
                .zip(self.end.iter())
                .map(|(s, e)| s + (e - s) * frac)
                .collect();
            let waypoint = if frac >= 1.0 { 1 } else { 0 };
            (pos, waypoint)
        }

        fn max_time(&self) -> f64 {
            self.duration_s
        }
    }
}
