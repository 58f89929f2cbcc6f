//! Published telemetry snapshots (§4.4 `StatePublisher`).
//!
//! Each is an immutable, defensively-copied snapshot assembled under the
//! controller lock and handed to the publish channels outside it (§5).

use uuid::Uuid;

use crate::feedback::{EndpointPose, EndpointVelocity};
use crate::flags::StateFlags;
use crate::state::{CommandMode, ControllerStateKind, EstopSource, OperationalMode};

/// Latest-value robot state, published on the `robot_state` wire.
#[derive(Debug, Clone)]
pub struct RobotState {
    pub command_mode: CommandMode,
    pub operational_mode: OperationalMode,
    pub controller_state: ControllerStateKind,
    pub estop_source: EstopSource,
    pub speed_ratio: f64,
    pub flags: StateFlags,
}

/// Latest-value extended robot state, published on `advanced_robot_state`.
///
/// Design note (spec §9, open question #2): the source this was distilled
/// from hard-codes `joint_position_units`/`joint_effort_units` to length 7
/// regardless of joint count. We size every per-joint vector to `N` instead
/// — a fixed `7` would silently truncate or overrun a 6- or 8-joint robot.
#[derive(Debug, Clone)]
pub struct AdvancedRobotState {
    pub robot_state: RobotState,
    /// Defensive copy of the last joint position feedback, length 0 or N.
    pub joint_position: Vec<f64>,
    /// Defensive copy of the last joint velocity feedback, length 0 or N.
    pub joint_velocity: Vec<f64>,
    /// Defensive copy of the last joint effort feedback, length 0 or N.
    pub joint_effort: Vec<f64>,
    /// Unit code per joint position entry, length == `joint_position.len()`.
    pub joint_position_units: Vec<u8>,
    /// Unit code per joint effort entry, length == `joint_effort.len()`.
    pub joint_effort_units: Vec<u8>,
    /// Last commanded joint position, if the multiplexer emitted one this
    /// tick; empty otherwise.
    ///
    /// Design note (spec §9, open question #3): the source left this (and
    /// the velocity counterpart below) permanently zero-length. We mirror
    /// the actual command sent this tick instead, since an "advanced" state
    /// snapshot with no commanded-value field is not useful to a client
    /// trying to diagnose tracking error.
    pub joint_position_command: Vec<f64>,
    /// Last commanded joint velocity, if any, this tick.
    pub joint_velocity_command: Vec<f64>,
    pub endpoint_pose: EndpointPose,
    pub endpoint_velocity: EndpointVelocity,
}

/// Sensor-data frame published on the lossy `robot_state_sensor_data` pipe
/// (§4.4, bounded backlog 3).
#[derive(Debug, Clone)]
pub struct RobotStateSensorData {
    /// Tick counter at the time this frame was produced.
    pub state_seqno: u64,
    /// UTC timestamp, sourced from a clock tagged with the robot's UUID
    /// (§4.4: "a clock whose UUID equals the robot UUID").
    pub timestamp_utc_ms: i64,
    pub clock_uuid: Uuid,
    pub joint_position: Vec<f64>,
    pub joint_velocity: Vec<f64>,
    pub joint_effort: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advanced_state_sizes_units_to_joint_count_not_seven() {
        let s = AdvancedRobotState {
            robot_state: RobotState {
                command_mode: CommandMode::Halt,
                operational_mode: OperationalMode::Automatic,
                controller_state: ControllerStateKind::MotorOn,
                estop_source: EstopSource::None,
                speed_ratio: 1.0,
                flags: StateFlags::empty(),
            },
            joint_position: vec![0.0; 6],
            joint_velocity: vec![0.0; 6],
            joint_effort: vec![0.0; 6],
            joint_position_units: vec![0; 6],
            joint_effort_units: vec![0; 6],
            joint_position_command: vec![],
            joint_velocity_command: vec![],
            endpoint_pose: vec![],
            endpoint_velocity: vec![],
        };
        assert_eq!(s.joint_position_units.len(), 6);
        assert_eq!(s.joint_effort_units.len(), 6);
        assert_ne!(s.joint_position_units.len(), 7);
    }
}
