//! Trajectory execution: the task state machine and the active+queued
//! lifecycle (§3 `TrajectoryQueue`, §4.5 `TrajectoryTask`).

pub mod queue;
pub mod task;

pub use queue::TrajectoryQueue;
pub use task::{TrajectoryProgress, TrajectoryTask, TrajectoryTaskId};

/// Trajectory task failures reuse the core's general error vocabulary —
/// `Next`/`Abort`/`Close` surface the same `OperationAborted`,
/// `OperationFailed`, and `ConnectionLost` kinds as the rest of the API.
pub type TrajectoryError = robocore_common::error::ApiError;
