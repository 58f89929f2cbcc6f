//! `TrajectoryTask` — per-task state machine (§4.5).
//!
//! A task is driven from two directions: `get_setpoint` is called once per
//! tick by the control loop (already holding the controller mutex), and
//! `Next`/`Abort`/`Close` are called by the owning client through
//! [`crate::api::TrajectoryHandle`], which re-acquires that same mutex for
//! each call rather than giving the task its own lock — this is the
//! message-passing shape from the design note on cyclic ownership
//! (`DESIGN.md`): the task never holds a reference back to the controller.

use robocore_common::error::ApiError;
use robocore_common::trajectory::SetpointResult;
use robocore_common::wire::ClientEndpointId;
use tokio::sync::oneshot;

use crate::transport::TrajectoryInterpolator;

/// Opaque task identity, unique within one controller's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrajectoryTaskId(pub u64);

/// Snapshot reported to a client polling `Next` (§4.5, §9).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrajectoryProgress {
    /// Still sitting behind another task in the queue.
    Queued,
    /// Active but `Next` has never been called; only `max_time_s` is valid.
    Ready { max_time_s: f64 },
    /// Latest computed setpoint.
    Running {
        t_seconds: f64,
        waypoint_index: usize,
    },
    /// The trajectory reached its end.
    Complete,
}

/// One queued-or-running trajectory (§3 `TrajectoryTask`).
pub struct TrajectoryTask {
    pub id: TrajectoryTaskId,
    pub owner: ClientEndpointId,
    interpolator: Box<dyn TrajectoryInterpolator>,

    queued: bool,
    next_called: bool,
    started: bool,
    first_call: bool,
    finished: bool,
    aborted: bool,

    start_time_ms: i64,
    last_progress: Option<(f64, usize)>,

    pending_next: Option<oneshot::Sender<Result<TrajectoryProgress, ApiError>>>,
    pending_queue_wait: Option<oneshot::Sender<()>>,
}

impl TrajectoryTask {
    pub fn new(
        id: TrajectoryTaskId,
        owner: ClientEndpointId,
        interpolator: Box<dyn TrajectoryInterpolator>,
        now_ms: i64,
    ) -> Self {
        Self {
            id,
            owner,
            interpolator,
            queued: false,
            next_called: false,
            started: false,
            first_call: false,
            finished: false,
            aborted: false,
            start_time_ms: now_ms,
            last_progress: None,
            pending_next: None,
            pending_queue_wait: None,
        }
    }

    pub fn mark_queued(&mut self) {
        self.queued = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished || self.aborted
    }

    /// Install a waiter for the next `get_setpoint` resolution, or resolve
    /// immediately if one is already due (§4.5: a fresh queued task returns
    /// `Queued` without waiting; an active, never-`Next`-ed task returns
    /// `Ready` without waiting).
    pub fn begin_next(&mut self) -> Option<Result<TrajectoryProgress, ApiError>> {
        if self.aborted {
            return Some(Err(ApiError::aborted("trajectory task aborted")));
        }
        if self.finished {
            return Some(Ok(TrajectoryProgress::Complete));
        }
        if !self.next_called {
            self.next_called = true;
            if self.queued {
                return Some(Ok(TrajectoryProgress::Queued));
            }
            return Some(Ok(TrajectoryProgress::Ready {
                max_time_s: self.interpolator.max_time(),
            }));
        }
        None
    }

    /// Register the oneshot sender a waiting `Next` call will await on.
    pub fn install_next_waiter(&mut self, tx: oneshot::Sender<Result<TrajectoryProgress, ApiError>>) {
        self.pending_next = Some(tx);
    }

    /// Poll-timeout fallback (§4.5: "on timeout, return `queued` if still
    /// not started, else the current running status").
    pub fn poll_status(&self) -> Result<TrajectoryProgress, ApiError> {
        if self.aborted {
            return Err(ApiError::aborted("trajectory task aborted"));
        }
        if self.finished {
            return Ok(TrajectoryProgress::Complete);
        }
        if self.queued {
            return Ok(TrajectoryProgress::Queued);
        }
        match self.last_progress {
            Some((t, w)) => Ok(TrajectoryProgress::Running {
                t_seconds: t,
                waypoint_index: w,
            }),
            None => Ok(TrajectoryProgress::Ready {
                max_time_s: self.interpolator.max_time(),
            }),
        }
    }

    /// Register the oneshot sender `queue_wait` needs — resolved when this
    /// task first produces a valid setpoint (i.e. is promoted and running).
    pub fn install_queue_waiter(&mut self, tx: oneshot::Sender<()>) {
        if !self.queued {
            let _ = tx.send(());
        } else {
            self.pending_queue_wait = Some(tx);
        }
    }

    /// Cooperative cancellation (`Close`, §4.5): fail the pending `Next`
    /// with `aborted`, leave the queue position of other tasks untouched.
    pub fn close(&mut self) {
        self.aborted = true;
        self.fail_pending_next(ApiError::aborted("trajectory task closed"));
        self.fail_pending_queue_wait();
    }

    /// Forced cancellation (`Abort`, or leaving trajectory mode, §4.3/§4.5).
    pub fn abort(&mut self, reason: ApiError) {
        self.aborted = true;
        self.fail_pending_next(reason.clone());
        self.fail_pending_queue_wait();
    }

    fn fail_pending_next(&mut self, reason: ApiError) {
        if let Some(tx) = self.pending_next.take() {
            let _ = tx.send(Err(reason));
        }
    }

    fn fail_pending_queue_wait(&mut self) {
        if let Some(tx) = self.pending_queue_wait.take() {
            drop(tx);
        }
    }

    /// §4.5 per-tick evaluation, called once per control-loop tick while
    /// this task is the active one.
    pub fn get_setpoint(
        &mut self,
        now_ms: i64,
        current_joint_position: &[f64],
        trajectory_error_tol_rad: f64,
    ) -> (SetpointResult, Option<Vec<f64>>) {
        if self.aborted {
            return (SetpointResult::InvalidState, None);
        }

        if self.next_called && !self.started {
            self.start_time_ms = now_ms;
            self.started = true;
            self.first_call = true;
        }

        let t = (now_ms - self.start_time_ms) as f64 / 1000.0;
        let (joint_pos, waypoint) = self.interpolator.interpolate(t);

        if self.started
            && current_joint_position.len() == joint_pos.len()
            && current_joint_position
                .iter()
                .zip(joint_pos.iter())
                .any(|(c, p)| (c - p).abs() > trajectory_error_tol_rad)
        {
            self.aborted = true;
            self.fail_pending_next(ApiError::failed("trajectory joint tolerance exceeded"));
            return (SetpointResult::JointTolError, None);
        }

        if !self.next_called {
            return (SetpointResult::Ready, None);
        }

        self.last_progress = Some((t, waypoint));

        if t > self.interpolator.max_time() {
            self.finished = true;
            if let Some(tx) = self.pending_next.take() {
                let _ = tx.send(Ok(TrajectoryProgress::Complete));
            }
            return (SetpointResult::TrajectoryComplete, Some(joint_pos));
        }

        if self.first_call {
            self.first_call = false;
            self.queued = false;
            if let Some(tx) = self.pending_queue_wait.take() {
                let _ = tx.send(());
            }
            if let Some(tx) = self.pending_next.take() {
                let _ = tx.send(Ok(TrajectoryProgress::Running {
                    t_seconds: t,
                    waypoint_index: waypoint,
                }));
            }
            return (SetpointResult::FirstValidSetpoint, Some(joint_pos));
        }

        if let Some(tx) = self.pending_next.take() {
            let _ = tx.send(Ok(TrajectoryProgress::Running {
                t_seconds: t,
                waypoint_index: waypoint,
            }));
        }
        (SetpointResult::ValidSetpoint, Some(joint_pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::test_doubles::LinearInterpolator;

    fn task(now_ms: i64) -> TrajectoryTask {
        TrajectoryTask::new(
            TrajectoryTaskId(1),
            ClientEndpointId(1),
            Box::new(LinearInterpolator {
                start: vec![0.0],
                end: vec![1.0],
                duration_s: 1.0,
            }),
            now_ms,
        )
    }

    #[test]
    fn ready_before_next_called() {
        let mut t = task(0);
        let (result, cmd) = t.get_setpoint(0, &[0.0], 0.01);
        assert_eq!(result, SetpointResult::Ready);
        assert!(cmd.is_none());
    }

    #[test]
    fn first_setpoint_after_next_is_first_valid() {
        let mut t = task(0);
        assert!(matches!(t.begin_next(), Some(Ok(TrajectoryProgress::Ready { .. }))));
        let (result, cmd) = t.get_setpoint(0, &[0.0], 0.01);
        assert_eq!(result, SetpointResult::FirstValidSetpoint);
        assert!(cmd.is_some());
    }

    #[test]
    fn completes_once_past_max_time() {
        let mut t = task(0);
        t.begin_next();
        t.get_setpoint(0, &[0.0], 0.01);
        let (result, cmd) = t.get_setpoint(2_000, &[1.0], 0.01);
        assert_eq!(result, SetpointResult::TrajectoryComplete);
        assert!(cmd.is_some());
        assert!(t.is_finished());
    }

    #[test]
    fn tolerance_violation_aborts_task() {
        let mut t = task(0);
        t.begin_next();
        t.get_setpoint(0, &[0.0], 0.01);
        let (result, _) = t.get_setpoint(100, &[5.0], 0.01);
        assert_eq!(result, SetpointResult::JointTolError);
        assert!(t.is_finished());
    }

    #[test]
    fn queued_task_reports_queued_then_ready_on_promotion() {
        let mut t = task(0);
        t.mark_queued();
        assert_eq!(t.begin_next(), Some(Ok(TrajectoryProgress::Queued)));
        assert!(t.queued);
    }

    #[test]
    fn close_fails_pending_next_with_aborted() {
        let mut t = task(0);
        let (tx, rx) = tokio::sync::oneshot::channel();
        t.install_next_waiter(tx);
        t.close();
        assert!(matches!(rx.try_recv(), Ok(Err(ApiError::OperationAborted(_)))));
    }
}
