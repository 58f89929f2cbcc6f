//! `fill_robot_command` — the per-tick mode dispatcher (§4.3).

use robocore_common::config::RobotConfig;
use robocore_common::error::ApiError;
use robocore_common::state::{CommandMode, ControllerState};
use robocore_common::units::PositionUnits;
use robocore_common::wire::{ClientEndpointId, WireCmdState, WireCommandPayload};

use crate::trajectory::TrajectoryQueue;

use super::jog::{self, JogState};
use super::wire as wire_mode;

/// Inputs the multiplexer needs that do not live on `ControllerState`
/// itself (§4.3).
pub struct MultiplexerInputs<'a> {
    pub now_ms: i64,
    pub current_joint_position: &'a [f64],
    pub position_latest: Option<&'a (ClientEndpointId, WireCommandPayload)>,
    pub velocity_latest: Option<&'a (ClientEndpointId, WireCommandPayload)>,
}

/// What to send to the transport this tick, and whether a trajectory is
/// still (or now) running (§4.4, reported in `robot_state`).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MultiplexerOutputs {
    pub position_command: Option<Vec<f64>>,
    pub velocity_command: Option<Vec<f64>>,
    pub trajectory_running: bool,
}

/// §4.3: clears the per-tick wire flags, aborts any trajectory queue left
/// over from a mode change, then dispatches on `state.command_mode`.
#[allow(clippy::too_many_arguments)]
pub fn fill_robot_command(
    state: &mut ControllerState,
    jog_state: &mut JogState,
    position_wire: &mut WireCmdState,
    velocity_wire: &mut WireCmdState,
    trajectories: &mut TrajectoryQueue,
    config: &RobotConfig,
    inputs: MultiplexerInputs<'_>,
) -> MultiplexerOutputs {
    position_wire.begin_tick();
    velocity_wire.begin_tick();

    if state.command_mode != CommandMode::Trajectory && !trajectories.is_empty() {
        trajectories.abandon_mode(ApiError::aborted("left trajectory mode"));
    }
    if state.command_mode != CommandMode::Jog {
        jog_state.clear(ApiError::aborted("left jog mode"));
    }

    match state.command_mode {
        CommandMode::Jog => {
            let pos = jog::evaluate_jog(jog_state, inputs.current_joint_position, config, inputs.now_ms);
            MultiplexerOutputs {
                position_command: pos,
                ..Default::default()
            }
        }
        CommandMode::PositionCommand => {
            let pos = wire_mode::fill_position_command(
                position_wire,
                inputs.position_latest,
                state.state_seqno,
                config.joint_count,
            );
            MultiplexerOutputs {
                position_command: pos,
                ..Default::default()
            }
        }
        CommandMode::VelocityCommand => {
            let vel = wire_mode::fill_velocity_command(
                velocity_wire,
                inputs.velocity_latest,
                state.state_seqno,
                config.joint_count,
                state.speed_ratio,
            );
            MultiplexerOutputs {
                velocity_command: vel,
                ..Default::default()
            }
        }
        CommandMode::Trajectory => {
            let tol_rad = PositionUnits::Degree.to_radians(config.trajectory_error_tol_deg);
            let (pos, running) =
                trajectories.tick(inputs.now_ms, inputs.current_joint_position, tol_rad);
            MultiplexerOutputs {
                position_command: pos,
                trajectory_running: running,
                ..Default::default()
            }
        }
        CommandMode::InvalidState | CommandMode::Halt | CommandMode::Homing => {
            MultiplexerOutputs::default()
        }
    }
}
