//! `TrajectoryQueue`: at most one active task plus a FIFO of queued ones
//! (§3, §4.3, §4.5).
//!
//! The spec's C-derived `t_index == -1` "no active task" sentinel becomes
//! `Option<TrajectoryTask>` here — there is no invalid index to guard
//! against (spec §9 design note).

use std::collections::VecDeque;

use robocore_common::error::ApiError;
use robocore_common::trajectory::SetpointResult;

use super::task::{TrajectoryTask, TrajectoryTaskId};

#[derive(Default)]
pub struct TrajectoryQueue {
    active: Option<TrajectoryTask>,
    queued: VecDeque<TrajectoryTask>,
}

impl TrajectoryQueue {
    /// Install a new task: becomes active if none is running, otherwise
    /// joins the back of the queue (§4.6 `execute_trajectory` step 4).
    pub fn push(&mut self, mut task: TrajectoryTask) {
        if self.active.is_none() {
            self.active = Some(task);
        } else {
            task.mark_queued();
            self.queued.push_back(task);
        }
    }

    pub fn find_mut(&mut self, id: TrajectoryTaskId) -> Option<&mut TrajectoryTask> {
        if self.active.as_ref().is_some_and(|t| t.id == id) {
            return self.active.as_mut();
        }
        self.queued.iter_mut().find(|t| t.id == id)
    }

    /// Remove a task (`Close`/`Abort`) by id. If the removed task was
    /// active, promote the next queued one (§4.5: the queue keeps moving
    /// unless the whole mode is abandoned — that path goes through
    /// [`Self::abandon_mode`] instead).
    pub fn remove(&mut self, id: TrajectoryTaskId) {
        if self.active.as_ref().is_some_and(|t| t.id == id) {
            self.active = self.queued.pop_front();
            return;
        }
        self.queued.retain(|t| t.id != id);
    }

    /// Mode changed away from `Trajectory` (§4.3): abort the active task
    /// and fail every queued one, without promoting — the queue is
    /// abandoned wholesale.
    pub fn abandon_mode(&mut self, reason: ApiError) {
        if let Some(mut task) = self.active.take() {
            task.abort(reason.clone());
        }
        for mut task in self.queued.drain(..) {
            task.abort(reason.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none() && self.queued.is_empty()
    }

    /// §4.3 per-tick evaluation: drive the active task, promote on
    /// completion, drop and flush the rest of the queue on terminal
    /// failure. Returns the command to send this tick (if any) and whether
    /// a task is still/now running.
    pub fn tick(
        &mut self,
        now_ms: i64,
        current_joint_position: &[f64],
        trajectory_error_tol_rad: f64,
    ) -> (Option<Vec<f64>>, bool) {
        let Some(task) = self.active.as_mut() else {
            return (None, false);
        };

        let (result, cmd) = task.get_setpoint(now_ms, current_joint_position, trajectory_error_tol_rad);

        match result {
            SetpointResult::TrajectoryComplete => {
                self.active = self.queued.pop_front();
                (cmd, self.active.is_some())
            }
            r if r.is_terminal_failure() => {
                self.active = self.queued.pop_front();
                for mut remaining in std::mem::take(&mut self.queued) {
                    remaining.abort(ApiError::aborted("preceding trajectory task failed"));
                }
                (None, self.active.is_some())
            }
            _ => (cmd, true),
        }
    }
}
