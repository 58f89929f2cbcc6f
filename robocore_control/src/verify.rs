//! `StateVerifier`: `verify_communication` + `verify_robot_state` (§4.2).
//!
//! Both are pure functions over `&mut ControllerState` plus the inputs
//! they need — no locking here, the caller (the control loop, §4.1) already
//! holds the controller mutex for the whole tick.

use robocore_common::config::RobotConfig;
use robocore_common::feedback::RobotFeedback;
use robocore_common::state::{CommandMode, ControllerState, ControllerStateKind};

/// §4.2 `verify_communication`.
///
/// Returns `true` if communications are healthy. On failure, forces
/// `InvalidState`, clears operational/controller state, and clears the
/// feedback vectors (§3 invariant: `communication_failure` ⇒ feedback
/// vectors are empty).
pub fn verify_communication(
    state: &mut ControllerState,
    feedback: &mut RobotFeedback,
    config: &RobotConfig,
    now_ms: i64,
) -> bool {
    let age_ms = feedback.max_arrival_age_ms(now_ms);
    if age_ms > config.communication_timeout_ms as i64 {
        state.clear_on_communication_failure();
        feedback.clear_vectors();
        false
    } else {
        state.communication_failure = false;
        true
    }
}

/// §4.2 `verify_robot_state` policy table.
///
/// Must only be called once `verify_communication` has returned `true` for
/// this tick (the multiplexer in `cycle.rs` short-circuits otherwise, same
/// as the source's `state_ok = comm_ok && verify_robot_state(now)`).
pub fn verify_robot_state(state: &mut ControllerState) -> bool {
    if state.command_mode == CommandMode::Homing
        && state.enabled
        && !state.error
        && !state.communication_failure
    {
        state.controller_state = ControllerStateKind::MotorOff;
        return true;
    }

    if !state.ready || state.communication_failure {
        state.controller_state = if state.stopped {
            ControllerStateKind::EmergencyStop
        } else if state.error {
            ControllerStateKind::GuardStop
        } else {
            ControllerStateKind::MotorOff
        };
        state.command_mode = CommandMode::InvalidState;
        return false;
    }

    if !state.enabled {
        state.controller_state = ControllerStateKind::MotorOff;
        state.command_mode = CommandMode::InvalidState;
        return false;
    }

    if state.command_mode == CommandMode::InvalidState {
        state.command_mode = CommandMode::Halt;
    }
    state.controller_state = ControllerStateKind::MotorOn;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use robocore_common::config::RobotConfig;
    use uuid::Uuid;

    fn config() -> RobotConfig {
        RobotConfig::new_default(6, Uuid::nil())
    }

    fn fresh_feedback(now_ms: i64) -> RobotFeedback {
        RobotFeedback {
            joint_position: vec![0.0; 6],
            joint_arrival_ms: now_ms,
            health_arrival_ms: now_ms,
            endpoint_arrival_ms: now_ms,
            ..Default::default()
        }
    }

    #[test]
    fn stale_feedback_triggers_communication_failure() {
        let cfg = config();
        let mut state = ControllerState::default();
        let mut fb = fresh_feedback(0);
        fb.joint_position = vec![1.0; 6];
        assert!(!verify_communication(&mut state, &mut fb, &cfg, 1_000));
        assert!(state.communication_failure);
        assert_eq!(state.command_mode, CommandMode::InvalidState);
        assert!(fb.joint_position.is_empty());
    }

    #[test]
    fn fresh_feedback_passes() {
        let cfg = config();
        let mut state = ControllerState::default();
        let mut fb = fresh_feedback(1_000);
        assert!(verify_communication(&mut state, &mut fb, &cfg, 1_000));
        assert!(!state.communication_failure);
    }

    #[test]
    fn homing_with_enabled_no_error_sets_motor_off_and_ok() {
        let mut state = ControllerState {
            command_mode: CommandMode::Homing,
            enabled: true,
            ready: true,
            ..ControllerState::default()
        };
        assert!(verify_robot_state(&mut state));
        assert_eq!(state.controller_state, ControllerStateKind::MotorOff);
        assert_eq!(state.command_mode, CommandMode::Homing);
    }

    #[test]
    fn not_ready_and_stopped_yields_emergency_stop() {
        let mut state = ControllerState {
            ready: false,
            stopped: true,
            ..ControllerState::default()
        };
        assert!(!verify_robot_state(&mut state));
        assert_eq!(state.controller_state, ControllerStateKind::EmergencyStop);
        assert_eq!(state.command_mode, CommandMode::InvalidState);
    }

    #[test]
    fn not_ready_and_error_yields_guard_stop() {
        let mut state = ControllerState {
            ready: false,
            error: true,
            ..ControllerState::default()
        };
        assert!(!verify_robot_state(&mut state));
        assert_eq!(state.controller_state, ControllerStateKind::GuardStop);
    }

    #[test]
    fn not_ready_neither_stopped_nor_error_yields_motor_off() {
        let mut state = ControllerState {
            ready: false,
            ..ControllerState::default()
        };
        assert!(!verify_robot_state(&mut state));
        assert_eq!(state.controller_state, ControllerStateKind::MotorOff);
    }

    #[test]
    fn comm_failure_overrides_ready() {
        let mut state = ControllerState {
            ready: true,
            communication_failure: true,
            ..ControllerState::default()
        };
        assert!(!verify_robot_state(&mut state));
        assert_eq!(state.command_mode, CommandMode::InvalidState);
    }

    #[test]
    fn ready_but_not_enabled_yields_motor_off_invalid_state() {
        let mut state = ControllerState {
            ready: true,
            enabled: false,
            ..ControllerState::default()
        };
        assert!(!verify_robot_state(&mut state));
        assert_eq!(state.controller_state, ControllerStateKind::MotorOff);
        assert_eq!(state.command_mode, CommandMode::InvalidState);
    }

    #[test]
    fn ready_enabled_invalid_state_transitions_to_halt_and_motor_on() {
        let mut state = ControllerState {
            ready: true,
            enabled: true,
            command_mode: CommandMode::InvalidState,
            ..ControllerState::default()
        };
        assert!(verify_robot_state(&mut state));
        assert_eq!(state.command_mode, CommandMode::Halt);
        assert_eq!(state.controller_state, ControllerStateKind::MotorOn);
    }

    #[test]
    fn ready_enabled_non_invalid_mode_stays_and_motor_on() {
        let mut state = ControllerState {
            ready: true,
            enabled: true,
            command_mode: CommandMode::PositionCommand,
            ..ControllerState::default()
        };
        assert!(verify_robot_state(&mut state));
        assert_eq!(state.command_mode, CommandMode::PositionCommand);
        assert_eq!(state.controller_state, ControllerStateKind::MotorOn);
    }
}
