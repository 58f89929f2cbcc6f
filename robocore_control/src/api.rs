//! `PublicAPI` (§4.6): the async surface client RPC handlers call into.
//!
//! Every method here briefly locks the controller mutex to read or mutate
//! `ControllerInner`, then returns — except `jog_joint`, which awaits a
//! completion promise, and `TrajectoryHandle::next`, which awaits a
//! progress signal. Neither holds the lock while awaiting.

use std::sync::Arc;
use std::time::Duration;

use robocore_common::error::ApiError;
use robocore_common::state::{CommandMode, ControllerStateKind, EstopSource, OperationalMode, SPEED_RATIO_MAX, SPEED_RATIO_MIN};
use robocore_common::units::PositionUnits;
use robocore_common::wire::{ClientEndpointId, WireCommandPayload};
use tokio::sync::oneshot;

use crate::core::{ControllerShared, RobotController};
use crate::transport::{TrajectoryInterpolator, TrajectoryLoader};
use crate::trajectory::{TrajectoryProgress, TrajectoryTask, TrajectoryTaskId};

/// Hardware-reported health booleans (§3 `ControllerState` fields not
/// derived from wire commands). Written by the transport the same way it
/// writes `RobotFeedback` — "a handle to the controller's feedback slot",
/// `transport.rs` — rather than inferred by the core itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotHealth {
    pub ready: bool,
    pub enabled: bool,
    pub stopped: bool,
    pub error: bool,
    pub homed: bool,
    pub estop_source: EstopSource,
}

/// Read-only snapshot for `GetRobotInfo` (SPEC_FULL.md §G).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotInfo {
    pub joint_count: usize,
    pub operational_mode: OperationalMode,
    pub controller_state: ControllerStateKind,
    pub estop_source: EstopSource,
    pub homed: bool,
    pub ready: bool,
    pub enabled: bool,
    pub speed_ratio: f64,
}

impl RobotController {
    /// Request a command-mode transition (§4.6).
    ///
    /// `invalid_state → homing` only requires `enabled && !communication_failure`
    /// — homing is how a disabled-but-not-ready robot becomes ready, so it
    /// cannot itself demand readiness. Every other transition requires
    /// `ready && !communication_failure`, and must pass through `Halt`
    /// first: a non-halt target is only accepted if the current mode is
    /// already `Halt`.
    pub async fn set_command_mode(&self, mode: CommandMode) -> Result<(), ApiError> {
        let mut inner = self.shared.inner.lock();
        let current = inner.state.command_mode;

        if current == CommandMode::InvalidState && mode == CommandMode::Homing {
            if !inner.state.enabled || inner.state.communication_failure {
                return Err(ApiError::invalid_state(
                    "cannot enter homing while disabled or in communication failure",
                ));
            }
        } else {
            if !inner.state.ready || inner.state.communication_failure {
                return Err(ApiError::invalid_state(
                    "cannot change command mode while not ready",
                ));
            }
            if mode != CommandMode::Halt && current != CommandMode::Halt {
                return Err(ApiError::invalid_state(
                    "must pass through halt before entering a different mode",
                ));
            }
        }

        tracing::info!(from = ?current, to = ?mode, "command mode transition");
        inner.state.command_mode = mode;
        Ok(())
    }

    /// Commanded stop (§4.6): a no-op while `InvalidState`, otherwise always
    /// allowed even if not ready.
    pub async fn halt(&self) -> Result<(), ApiError> {
        let mut inner = self.shared.inner.lock();
        if inner.state.command_mode == CommandMode::InvalidState {
            return Ok(());
        }
        tracing::info!(from = ?inner.state.command_mode, "halt commanded");
        inner.state.command_mode = CommandMode::Halt;
        Ok(())
    }

    pub async fn disable(&self) {
        self.shared.transport.send_disable().await;
    }

    pub async fn enable(&self) {
        self.shared.transport.send_enable().await;
    }

    pub async fn reset_errors(&self) {
        self.shared.transport.send_reset_errors().await;
    }

    pub fn get_speed_ratio(&self) -> f64 {
        self.shared.inner.lock().state.speed_ratio
    }

    /// §3: `speed_ratio` bounds.
    pub async fn set_speed_ratio(&self, ratio: f64) -> Result<(), ApiError> {
        if !(SPEED_RATIO_MIN..=SPEED_RATIO_MAX).contains(&ratio) {
            return Err(ApiError::invalid_argument(format!(
                "speed_ratio {ratio} outside [{SPEED_RATIO_MIN}, {SPEED_RATIO_MAX}]"
            )));
        }
        self.shared.inner.lock().state.speed_ratio = ratio;
        Ok(())
    }

    pub fn get_robot_info(&self) -> RobotInfo {
        let inner = self.shared.inner.lock();
        RobotInfo {
            joint_count: self.shared.config.joint_count,
            operational_mode: inner.state.operational_mode,
            controller_state: inner.state.controller_state,
            estop_source: inner.state.estop_source,
            homed: inner.state.homed,
            ready: inner.state.ready,
            enabled: inner.state.enabled,
            speed_ratio: inner.state.speed_ratio,
        }
    }

    /// Write a fresh feedback snapshot (§3 `RobotFeedback`), replacing the
    /// previous one wholesale (allocate-then-swap, §5). Called by the
    /// transport, never by a client.
    pub fn update_feedback(&self, feedback: robocore_common::feedback::RobotFeedback) {
        self.shared.inner.lock().feedback = feedback;
    }

    /// Write fresh hardware health booleans. Called by the transport,
    /// never by a client.
    pub fn update_health(&self, health: RobotHealth) {
        let mut inner = self.shared.inner.lock();
        inner.state.ready = health.ready;
        inner.state.enabled = health.enabled;
        inner.state.stopped = health.stopped;
        inner.state.error = health.error;
        inner.state.homed = health.homed;
        inner.state.estop_source = health.estop_source;
    }

    /// Publish a position wire command (§6). Fire-and-forget: validation
    /// and unit conversion happen in the multiplexer on the next tick.
    pub fn send_position_command(&self, endpoint: ClientEndpointId, payload: WireCommandPayload) {
        let _ = self.shared.position_command_tx.send(Some((endpoint, payload)));
    }

    /// Publish a velocity wire command (§6).
    pub fn send_velocity_command(&self, endpoint: ClientEndpointId, payload: WireCommandPayload) {
        let _ = self.shared.velocity_command_tx.send(Some((endpoint, payload)));
    }

    /// Jog a target into the joints, completing once every joint is within
    /// tolerance or the jog timeout elapses (§4.6).
    ///
    /// `relative` interprets `target` as a delta from the current joint
    /// position rather than an absolute target. `max_vel_deg_s` bounds the
    /// per-tick step size (0 or negative means unbounded, i.e. command the
    /// target outright). `wait` selects whether this call blocks on
    /// completion or returns immediately once the jog is installed.
    ///
    /// Rejects targets further than `jog_joint_limit_deg` from the current
    /// joint position (§3 `JogState` invariant) before installing them.
    pub async fn jog_joint(
        &self,
        target: Vec<f64>,
        max_vel_deg_s: f64,
        relative: bool,
        wait: bool,
    ) -> Result<(), ApiError> {
        if target.len() != self.shared.config.joint_count {
            return Err(ApiError::invalid_argument("target length mismatch"));
        }

        let rx = {
            let mut inner = self.shared.inner.lock();
            if inner.state.command_mode != CommandMode::Jog {
                return Err(ApiError::invalid_state("not in jog mode"));
            }

            let resolved_target = if relative {
                if inner.feedback.joint_position.len() != target.len() {
                    return Err(ApiError::invalid_argument(
                        "feedback length mismatch for relative jog",
                    ));
                }
                inner
                    .feedback
                    .joint_position
                    .iter()
                    .zip(target.iter())
                    .map(|(current, delta)| current + delta)
                    .collect::<Vec<_>>()
            } else {
                target
            };

            let limit_rad = PositionUnits::Degree.to_radians(self.shared.config.jog_joint_limit_deg);
            if inner.feedback.joint_position.len() == resolved_target.len()
                && inner
                    .feedback
                    .joint_position
                    .iter()
                    .zip(resolved_target.iter())
                    .any(|(current, want)| (current - want).abs() > limit_rad)
            {
                return Err(ApiError::invalid_argument(
                    "jog target exceeds per-joint step limit",
                ));
            }

            let max_vel_rad_s = if max_vel_deg_s > 0.0 {
                PositionUnits::Degree.to_radians(max_vel_deg_s)
            } else {
                0.0
            };

            let now_ms = self.shared.clock.now_ms();
            let (tx, rx) = oneshot::channel();
            inner.jog.set_target(resolved_target, max_vel_rad_s, now_ms, tx);
            rx
        };

        if !wait {
            return Ok(());
        }

        rx.await.map_err(|_| ApiError::aborted("jog cancelled"))?
    }

    /// Start (or queue) a trajectory (§4.6 `execute_trajectory`).
    ///
    /// Builds the interpolator before acquiring the controller lock — the
    /// loader has no access to controller state (`transport::TrajectoryLoader`).
    /// Step 3: evaluates the interpolator at `t=0` and rejects the
    /// trajectory up front if its start point is further than
    /// `trajectory_error_tol_deg` from the robot's current joint position,
    /// rather than letting it fail mid-run on the first per-tick tolerance
    /// check.
    pub async fn execute_trajectory<L: TrajectoryLoader>(
        &self,
        owner: ClientEndpointId,
        loader: &L,
        definition: &L::Definition,
    ) -> Result<TrajectoryHandle, ApiError> {
        let (speed_ratio, current_joint_position) = {
            let inner = self.shared.inner.lock();
            (inner.state.speed_ratio, inner.feedback.joint_position.clone())
        };
        let interpolator: Box<dyn TrajectoryInterpolator> = loader.load(definition, speed_ratio);

        let (start_position, _) = interpolator.interpolate(0.0);
        let tol_rad = PositionUnits::Degree.to_radians(self.shared.config.trajectory_error_tol_deg);
        if start_position.len() == current_joint_position.len()
            && start_position
                .iter()
                .zip(current_joint_position.iter())
                .any(|(start, current)| (start - current).abs() > tol_rad)
        {
            return Err(ApiError::invalid_argument(
                "trajectory start point exceeds current-position tolerance",
            ));
        }

        let now_ms = self.shared.clock.now_ms();

        let id = {
            let mut inner = self.shared.inner.lock();
            if inner.state.command_mode != CommandMode::Trajectory {
                return Err(ApiError::invalid_state("not in trajectory mode"));
            }
            let id = TrajectoryTaskId(inner.next_trajectory_id);
            inner.next_trajectory_id += 1;
            let task = TrajectoryTask::new(id, owner, interpolator, now_ms);
            inner.trajectories.push(task);
            id
        };
        tracing::info!(task_id = id.0, owner = owner.0, "trajectory task started");

        let handle = TrajectoryHandle {
            shared: Arc::clone(&self.shared),
            id,
            owner,
        };
        handle.spawn_liveness_watcher();
        Ok(handle)
    }
}

/// Per-task client handle returned by `execute_trajectory` (§4.5).
///
/// Holds a strong reference to the controller's shared state but the
/// reverse link does not exist — `TrajectoryTask` itself never points back
/// to the controller (spec §9 design note on cyclic ownership).
pub struct TrajectoryHandle {
    shared: Arc<ControllerShared>,
    id: TrajectoryTaskId,
    owner: ClientEndpointId,
}

impl TrajectoryHandle {
    /// Await the next setpoint-progress signal, or the immediate status if
    /// one is already due (§4.5).
    pub async fn next(&self) -> Result<TrajectoryProgress, ApiError> {
        let rx = {
            let mut inner = self.shared.inner.lock();
            let task = match inner.trajectories.find_mut(self.id) {
                Some(task) => task,
                None => return Ok(TrajectoryProgress::Complete),
            };
            if let Some(result) = task.begin_next() {
                return result;
            }
            let (tx, rx) = oneshot::channel();
            task.install_next_waiter(tx);
            rx
        };

        match tokio::time::timeout(Duration::from_millis(5_000), rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ApiError::aborted("trajectory task cancelled")),
            Err(_elapsed) => {
                let mut inner = self.shared.inner.lock();
                match inner.trajectories.find_mut(self.id) {
                    Some(task) => task.poll_status(),
                    None => Ok(TrajectoryProgress::Complete),
                }
            }
        }
    }

    /// Forced cancellation: fails the pending `Next` with `aborted` and
    /// removes the task, promoting the next queued one if this was active
    /// (§4.5). Leaving `Trajectory` mode entirely goes through
    /// `TrajectoryQueue::abandon_mode` instead (§4.3).
    pub async fn abort(&self) {
        tracing::warn!(task_id = self.id.0, "trajectory task aborted");
        let mut inner = self.shared.inner.lock();
        if let Some(task) = inner.trajectories.find_mut(self.id) {
            task.abort(ApiError::aborted("trajectory aborted by client"));
        }
        inner.trajectories.remove(self.id);
    }

    /// Cooperative cancellation: same removal as `abort`, without implying
    /// any fault (§4.5 `Close`).
    pub async fn close(&self) {
        tracing::info!(task_id = self.id.0, "trajectory task closed");
        let mut inner = self.shared.inner.lock();
        if let Some(task) = inner.trajectories.find_mut(self.id) {
            task.close();
        }
        inner.trajectories.remove(self.id);
    }

    fn spawn_liveness_watcher(&self) {
        let shared = Arc::clone(&self.shared);
        let id = self.id;
        let owner = self.owner;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(50)).await;
                let still_pending = {
                    let mut inner = shared.inner.lock();
                    matches!(inner.trajectories.find_mut(id), Some(task) if !task.is_finished())
                };
                if !still_pending {
                    return;
                }
                if !shared.endpoint_health.is_connected(owner).await {
                    tracing::warn!(task_id = id.0, owner = owner.0, "trajectory owner disconnected");
                    let mut inner = shared.inner.lock();
                    if let Some(task) = inner.trajectories.find_mut(id) {
                        task.abort(ApiError::connection_lost("owning endpoint disconnected"));
                    }
                    inner.trajectories.remove(id);
                    return;
                }
            }
        });
    }
}
