//! # Robot Control Core — Common Types
//!
//! Shared, logic-free data types for the robot control core: robot
//! configuration, controller state, feedback, wire command payloads,
//! trajectory setpoint results, the flag bitmask, and the crate's
//! error vocabulary.
//!
//! This crate has no control-loop logic of its own — it is the
//! vocabulary `robocore_control` is built from.

pub mod config;
pub mod error;
pub mod feedback;
pub mod flags;
pub mod state;
pub mod telemetry;
pub mod trajectory;
pub mod units;
pub mod wire;

pub mod prelude {
    //! Re-exports of the types most commonly needed together.
    pub use crate::config::RobotConfig;
    pub use crate::error::ApiError;
    pub use crate::feedback::{EndpointPose, EndpointVelocity, RobotFeedback};
    pub use crate::flags::StateFlags;
    pub use crate::state::{CommandMode, ControllerState, ControllerStateKind, EstopSource};
    pub use crate::telemetry::{AdvancedRobotState, RobotState, RobotStateSensorData};
    pub use crate::trajectory::SetpointResult;
    pub use crate::units::{PositionUnits, VelocityUnits};
    pub use crate::wire::WireCommandPayload;
}
