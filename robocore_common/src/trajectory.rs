//! Trajectory setpoint results and the running-status shape reported to
//! clients (§4.3 mapping table, §4.5).

/// Outcome of one `TrajectoryTask::get_setpoint` call (§4.3 mapping table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetpointResult {
    /// `Next` has not yet been called; only `trajectory_max_time` is valid.
    Ready,
    /// First setpoint since the task started running.
    FirstValidSetpoint,
    /// Steady-state setpoint.
    ValidSetpoint,
    /// Trajectory reached its end; this was the last setpoint.
    TrajectoryComplete,
    /// Interpolator reported failure.
    Failed,
    /// Task was aborted/cancelled/in an invalid state.
    InvalidState,
    /// Measured joint deviated from the commanded setpoint beyond tolerance.
    JointTolError,
}

impl SetpointResult {
    /// True for the three results that still produce a valid `(pos, vel)`
    /// pair to send this tick (§4.3 mapping table "trajectory_valid" column).
    #[inline]
    pub const fn is_trajectory_valid(&self) -> bool {
        matches!(
            self,
            Self::Ready
                | Self::FirstValidSetpoint
                | Self::ValidSetpoint
                | Self::TrajectoryComplete
        )
    }

    /// True when the multiplexer should actually emit a command this tick
    /// (everything valid except the bare `Ready` placeholder, §4.3).
    #[inline]
    pub const fn should_send(&self) -> bool {
        matches!(
            self,
            Self::FirstValidSetpoint | Self::ValidSetpoint | Self::TrajectoryComplete
        )
    }

    /// True when the active task should be dropped and the queue flushed
    /// (§4.3 mapping table).
    #[inline]
    pub const fn is_terminal_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::InvalidState | Self::JointTolError)
    }
}
