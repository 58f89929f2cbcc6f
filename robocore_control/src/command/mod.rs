//! Command multiplexer: per-mode evaluation, dispatched by `fill_robot_command` (§4.3).

pub mod jog;
pub mod multiplexer;
pub mod wire;

pub use jog::JogState;
pub use multiplexer::{fill_robot_command, MultiplexerInputs, MultiplexerOutputs};
