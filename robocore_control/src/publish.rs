//! `StatePublisher`: assembles the three telemetry snapshots every tick
//! (§4.4).
//!
//! Runs under the controller lock; the snapshots themselves are handed off
//! to the publish channels (outside the lock) by `core.rs`.

use robocore_common::config::RobotConfig;
use robocore_common::feedback::RobotFeedback;
use robocore_common::flags::StateFlags;
use robocore_common::state::ControllerState;
use robocore_common::telemetry::{AdvancedRobotState, RobotState, RobotStateSensorData};
use robocore_common::units::PositionUnits;

/// §4.4 `fill_state_flags`: assemble the flag bitmask from `ControllerState`
/// (and, implicitly, `RobotFeedback` staleness already folded into
/// `communication_failure` by `verify_communication`).
///
/// "When `communication_failure` is set, every other bit is clear" (§4.4) —
/// enforced here by returning early. `position_sent_this_tick`/
/// `velocity_sent_this_tick` report whether a wire payload was actually
/// accepted this tick (§8), not merely whether the mode is selected.
pub fn fill_state_flags(
    state: &ControllerState,
    trajectory_running: bool,
    position_sent_this_tick: bool,
    velocity_sent_this_tick: bool,
) -> StateFlags {
    if state.communication_failure {
        return StateFlags::COMMUNICATION_FAILURE;
    }

    let mut flags = StateFlags::empty();
    flags.set(StateFlags::ERROR, state.error);
    flags.set(StateFlags::ESTOP, state.estop_source.is_active());
    flags.set(
        StateFlags::ESTOP_BUTTON1,
        state.estop_source == robocore_common::state::EstopSource::Button1,
    );
    flags.set(
        StateFlags::ESTOP_OTHER,
        state.estop_source == robocore_common::state::EstopSource::Other,
    );
    flags.set(
        StateFlags::ESTOP_FAULT,
        state.estop_source == robocore_common::state::EstopSource::Fault,
    );
    flags.set(
        StateFlags::ESTOP_INTERNAL,
        state.estop_source == robocore_common::state::EstopSource::Internal,
    );
    flags.set(StateFlags::ENABLED, state.enabled);
    flags.set(StateFlags::READY, state.ready);
    flags.set(StateFlags::HOMED, state.homed);
    flags.set(StateFlags::HOMING_REQUIRED, !state.homed);
    flags.set(StateFlags::VALID_POSITION_COMMAND, position_sent_this_tick);
    flags.set(StateFlags::VALID_VELOCITY_COMMAND, velocity_sent_this_tick);
    flags.set(StateFlags::TRAJECTORY_RUNNING, trajectory_running);
    flags
}

/// §4.4 `fill_states`: build all three telemetry snapshots for this tick.
#[allow(clippy::too_many_arguments)]
pub fn fill_states(
    state: &ControllerState,
    feedback: &RobotFeedback,
    config: &RobotConfig,
    position_command: Option<&[f64]>,
    velocity_command: Option<&[f64]>,
    trajectory_running: bool,
    position_sent_this_tick: bool,
    velocity_sent_this_tick: bool,
    now_ms: i64,
) -> (RobotState, AdvancedRobotState, RobotStateSensorData) {
    let flags = fill_state_flags(
        state,
        trajectory_running,
        position_sent_this_tick,
        velocity_sent_this_tick,
    );

    let robot_state = RobotState {
        command_mode: state.command_mode,
        operational_mode: state.operational_mode,
        controller_state: state.controller_state,
        estop_source: state.estop_source,
        speed_ratio: state.speed_ratio,
        flags,
    };

    let advanced = AdvancedRobotState {
        robot_state: robot_state.clone(),
        joint_position: feedback.joint_position.clone(),
        joint_velocity: feedback.joint_velocity.clone(),
        joint_effort: feedback.joint_effort.clone(),
        joint_position_units: vec![PositionUnits::Radian as u8; feedback.joint_position.len()],
        joint_effort_units: vec![PositionUnits::Radian as u8; feedback.joint_effort.len()],
        joint_position_command: position_command.map(|c| c.to_vec()).unwrap_or_default(),
        joint_velocity_command: velocity_command.map(|c| c.to_vec()).unwrap_or_default(),
        endpoint_pose: feedback.endpoint_pose.clone(),
        endpoint_velocity: feedback.endpoint_velocity.clone(),
    };

    let sensor_data = RobotStateSensorData {
        state_seqno: state.state_seqno,
        timestamp_utc_ms: now_ms,
        clock_uuid: config.device_uuid,
        joint_position: feedback.joint_position.clone(),
        joint_velocity: feedback.joint_velocity.clone(),
        joint_effort: feedback.joint_effort.clone(),
    };

    (robot_state, advanced, sensor_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use robocore_common::state::{CommandMode, EstopSource};
    use uuid::Uuid;

    fn config() -> RobotConfig {
        RobotConfig::new_default(3, Uuid::nil())
    }

    #[test]
    fn communication_failure_clears_every_other_bit() {
        let state = ControllerState {
            communication_failure: true,
            enabled: true,
            ready: true,
            ..ControllerState::default()
        };
        let flags = fill_state_flags(&state, true, true, true);
        assert_eq!(flags, StateFlags::COMMUNICATION_FAILURE);
    }

    #[test]
    fn estop_source_sets_matching_bit_only() {
        let state = ControllerState {
            estop_source: EstopSource::Fault,
            ..ControllerState::default()
        };
        let flags = fill_state_flags(&state, false, false, false);
        assert!(flags.contains(StateFlags::ESTOP | StateFlags::ESTOP_FAULT));
        assert!(!flags.contains(StateFlags::ESTOP_BUTTON1));
    }

    #[test]
    fn valid_command_flags_track_sent_this_tick_not_mode() {
        let state = ControllerState {
            command_mode: CommandMode::PositionCommand,
            ..ControllerState::default()
        };
        // Mode is PositionCommand, but no payload was actually accepted
        // this tick (e.g. stale seqno) — the flag must stay clear.
        let flags = fill_state_flags(&state, false, false, false);
        assert!(!flags.contains(StateFlags::VALID_POSITION_COMMAND));

        let flags = fill_state_flags(&state, false, true, false);
        assert!(flags.contains(StateFlags::VALID_POSITION_COMMAND));
        assert!(!flags.contains(StateFlags::VALID_VELOCITY_COMMAND));
    }

    #[test]
    fn homing_required_ignores_ready() {
        let state = ControllerState {
            ready: false,
            homed: false,
            ..ControllerState::default()
        };
        let flags = fill_state_flags(&state, false, false, false);
        assert!(flags.contains(StateFlags::HOMING_REQUIRED));
    }

    #[test]
    fn advanced_state_reports_joint_count_sized_units() {
        let state = ControllerState::default();
        let feedback = RobotFeedback {
            joint_position: vec![0.0; 3],
            joint_effort: vec![0.0; 3],
            ..Default::default()
        };
        let (_, advanced, _) =
            fill_states(&state, &feedback, &config(), None, None, false, false, false, 0);
        assert_eq!(advanced.joint_position_units.len(), 3);
        assert_eq!(advanced.joint_effort_units.len(), 3);
    }

    #[test]
    fn advanced_state_reports_commanded_values_not_permanently_empty() {
        let state = ControllerState {
            command_mode: CommandMode::PositionCommand,
            ..ControllerState::default()
        };
        let feedback = RobotFeedback::default();
        let cmd = vec![1.0, 2.0, 3.0];
        let (_, advanced, _) =
            fill_states(&state, &feedback, &config(), Some(&cmd), None, false, true, false, 0);
        assert_eq!(advanced.joint_position_command, cmd);
        assert!(advanced.joint_velocity_command.is_empty());
    }

    #[test]
    fn sensor_data_carries_device_uuid_as_clock_uuid() {
        let cfg = config();
        let state = ControllerState::default();
        let feedback = RobotFeedback::default();
        let (_, _, sensor) =
            fill_states(&state, &feedback, &cfg, None, None, false, false, false, 42);
        assert_eq!(sensor.clock_uuid, cfg.device_uuid);
        assert_eq!(sensor.timestamp_utc_ms, 42);
    }
}
