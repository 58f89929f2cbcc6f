//! The core's error vocabulary (§7).
//!
//! `ApiError` covers every synchronous-or-promise-surfaced failure kind
//! named by §7; silent rejections (bad seqno, stale `state_seqno`, wrong
//! length, unknown units) are deliberately NOT errors — they are dropped,
//! per spec, and never constructed as `ApiError`.

use thiserror::Error;

/// Errors raised by `PublicAPI` calls or surfaced on a promise/stream
/// (§7).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    /// Invalid command mode requested, or an invalid transition attempted.
    #[error("invalid command mode: {0}")]
    InvalidArgument(String),

    /// Mode change attempted while not ready / in communication failure.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A pending jog or trajectory was superseded by a newer command or a
    /// mode change that invalidated it.
    #[error("operation aborted: {0}")]
    OperationAborted(String),

    /// A jog timed out, or a trajectory breached its tolerance.
    #[error("operation failed: {0}")]
    OperationFailed(String),

    /// The client endpoint owning a trajectory task became unreachable.
    #[error("connection lost: {0}")]
    ConnectionLost(String),
}

impl ApiError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
    pub fn aborted(msg: impl Into<String>) -> Self {
        Self::OperationAborted(msg.into())
    }
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::OperationFailed(msg.into())
    }
    pub fn connection_lost(msg: impl Into<String>) -> Self {
        Self::ConnectionLost(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_informative() {
        let e = ApiError::invalid_argument("speed_ratio out of range");
        assert!(format!("{e}").contains("speed_ratio out of range"));
    }

    #[test]
    fn variants_are_distinguishable() {
        assert_ne!(
            ApiError::aborted("x"),
            ApiError::failed("x")
        );
    }
}
