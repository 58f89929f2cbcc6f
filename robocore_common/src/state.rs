//! Controller state enums.
//!
//! Mirrors the shape of a real driver's global state machine: small
//! `#[repr(u8)]` enums with a `from_u8` round-trip and a `Default`, plus
//! the aggregate `ControllerState` record the control loop mutates once
//! per tick.

use serde::{Deserialize, Serialize};

/// Which command source the multiplexer is currently allowed to read from.
///
/// Only one is active at a time (§3 invariant). Leaving `Trajectory`
/// aborts every owned trajectory task (§3, §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CommandMode {
    /// Comms down or controller not ready — no command source is live.
    InvalidState = 0,
    /// Commanded stop; multiplexer emits nothing.
    Halt = 1,
    /// Manual jog target, bounded step.
    Jog = 2,
    /// Homing procedure in progress (external to the core).
    Homing = 3,
    /// Streamed absolute position setpoints over the position wire.
    PositionCommand = 4,
    /// Streamed velocity setpoints over the velocity wire.
    VelocityCommand = 5,
    /// Queued trajectory execution.
    Trajectory = 6,
}

impl CommandMode {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::InvalidState),
            1 => Some(Self::Halt),
            2 => Some(Self::Jog),
            3 => Some(Self::Homing),
            4 => Some(Self::PositionCommand),
            5 => Some(Self::VelocityCommand),
            6 => Some(Self::Trajectory),
            _ => None,
        }
    }
}

impl Default for CommandMode {
    fn default() -> Self {
        Self::InvalidState
    }
}

/// Coarse operational mode reported to clients alongside `CommandMode`.
///
/// The core does not interpret this value beyond storing and reporting it;
/// it exists for client display/bookkeeping, matching what a real driver
/// surfaces as a read-only companion to the command mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OperationalMode {
    Automatic = 0,
    Manual = 1,
    Service = 2,
}

impl OperationalMode {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Automatic),
            1 => Some(Self::Manual),
            2 => Some(Self::Service),
            _ => None,
        }
    }
}

impl Default for OperationalMode {
    fn default() -> Self {
        Self::Automatic
    }
}

/// Externally reported machine status (§4.2 policy table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ControllerStateKind {
    Undefined = 0,
    MotorOff = 1,
    MotorOn = 2,
    EmergencyStop = 3,
    GuardStop = 4,
}

impl ControllerStateKind {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Undefined),
            1 => Some(Self::MotorOff),
            2 => Some(Self::MotorOn),
            3 => Some(Self::EmergencyStop),
            4 => Some(Self::GuardStop),
            _ => None,
        }
    }
}

impl Default for ControllerStateKind {
    fn default() -> Self {
        Self::Undefined
    }
}

/// Source of an emergency-stop condition (§3, §4.4 flag bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EstopSource {
    None = 0,
    Button1 = 1,
    Other = 2,
    Fault = 3,
    Internal = 4,
}

impl EstopSource {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Button1),
            2 => Some(Self::Other),
            3 => Some(Self::Fault),
            4 => Some(Self::Internal),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl Default for EstopSource {
    fn default() -> Self {
        Self::None
    }
}

/// Minimum accepted `speed_ratio` (§3).
pub const SPEED_RATIO_MIN: f64 = 0.1;
/// Maximum accepted `speed_ratio` (§3).
pub const SPEED_RATIO_MAX: f64 = 10.0;

/// The controller's mutable global state record (§3 `ControllerState`).
///
/// One instance lives behind the controller-scoped mutex (§5) and is
/// mutated exactly by `StateVerifier` and `PublicAPI::set_command_mode`.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pub command_mode: CommandMode,
    pub operational_mode: OperationalMode,
    pub controller_state: ControllerStateKind,
    pub homed: bool,
    pub ready: bool,
    pub enabled: bool,
    pub stopped: bool,
    pub error: bool,
    pub communication_failure: bool,
    pub estop_source: EstopSource,
    pub state_seqno: u64,
    pub speed_ratio: f64,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            command_mode: CommandMode::default(),
            operational_mode: OperationalMode::default(),
            controller_state: ControllerStateKind::default(),
            homed: false,
            ready: false,
            enabled: false,
            stopped: false,
            error: false,
            communication_failure: false,
            estop_source: EstopSource::default(),
            state_seqno: 0,
            speed_ratio: 1.0,
        }
    }
}

impl ControllerState {
    /// Clear everything that `verify_communication` clears on comm loss
    /// (§4.2): forces `InvalidState`, drops operational/controller state.
    pub fn clear_on_communication_failure(&mut self) {
        self.communication_failure = true;
        self.command_mode = CommandMode::InvalidState;
        self.controller_state = ControllerStateKind::Undefined;
        self.operational_mode = OperationalMode::default();
    }
}
