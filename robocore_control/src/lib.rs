//! # Robot Control Core
//!
//! The control core of an abstract industrial-robot driver: a fixed-period
//! control loop that validates communications and controller health,
//! multiplexes between jog/position/velocity/trajectory command sources,
//! emits joint commands to a hardware transport, and publishes robot-state
//! telemetry. It also owns the trajectory execution state machine.
//!
//! ## What this crate is NOT
//!
//! The concrete hardware transport, the trajectory interpolator, the RPC
//! middleware, configuration *file* loading beyond parsing/validation, and
//! forward/inverse kinematics are external collaborators, reached only
//! through the traits in [`transport`].

#![deny(clippy::disallowed_types)]

pub mod api;
pub mod clock;
pub mod command;
pub mod config;
pub mod core;
pub mod cycle;
pub mod publish;
pub mod trajectory;
pub mod transport;
pub mod verify;

pub use crate::api::{RobotHealth, RobotInfo, TrajectoryHandle};
pub use crate::core::{ControllerHandles, RobotController};
