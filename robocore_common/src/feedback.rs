//! `RobotFeedback` — latest transport-supplied joint/endpoint data.
//!
//! Written by the transport callback (outside the core's scope), read
//! under the controller lock. Joint vectors are replaced wholesale
//! (allocate-then-swap, §5) rather than mutated element-wise.

/// Endpoint (tool/flange) Cartesian pose: `[x, y, z, qw, qx, qy, qz]` when
/// present, empty when not (§4.4: "0- or 1-length sequences").
pub type EndpointPose = Vec<f64>;
/// Endpoint spatial velocity: `[vx, vy, vz, wx, wy, wz]` when present.
pub type EndpointVelocity = Vec<f64>;

/// Latest feedback snapshot from the hardware transport (§3 `RobotFeedback`).
#[derive(Debug, Clone, Default)]
pub struct RobotFeedback {
    /// Joint position [rad], length 0 or N.
    pub joint_position: Vec<f64>,
    /// Joint velocity [rad/s], length 0 or N.
    pub joint_velocity: Vec<f64>,
    /// Joint effort, length 0 or N.
    pub joint_effort: Vec<f64>,
    /// Optional endpoint pose.
    pub endpoint_pose: EndpointPose,
    /// Optional endpoint spatial velocity.
    pub endpoint_velocity: EndpointVelocity,

    /// Monotonic arrival timestamp of the last joint feedback update [ms].
    pub joint_arrival_ms: i64,
    /// Monotonic arrival timestamp of the last robot-health update [ms].
    pub health_arrival_ms: i64,
    /// Monotonic arrival timestamp of the last endpoint update [ms].
    pub endpoint_arrival_ms: i64,
}

impl RobotFeedback {
    /// Clear all joint/endpoint vectors (§4.2, on communication failure).
    pub fn clear_vectors(&mut self) {
        self.joint_position.clear();
        self.joint_velocity.clear();
        self.joint_effort.clear();
        self.endpoint_pose.clear();
        self.endpoint_velocity.clear();
    }

    /// Oldest of the three arrival timestamps, relative to `now` [ms].
    ///
    /// Used by `verify_communication` (§4.2): communication has failed if
    /// this exceeds `communication_timeout_ms`.
    pub fn max_arrival_age_ms(&self, now_ms: i64) -> i64 {
        let oldest = self
            .joint_arrival_ms
            .min(self.health_arrival_ms)
            .min(self.endpoint_arrival_ms);
        now_ms - oldest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_feedback_has_zero_age() {
        let fb = RobotFeedback {
            joint_arrival_ms: 1_000,
            health_arrival_ms: 1_000,
            endpoint_arrival_ms: 1_000,
            ..Default::default()
        };
        assert_eq!(fb.max_arrival_age_ms(1_000), 0);
    }

    #[test]
    fn age_uses_oldest_timestamp() {
        let fb = RobotFeedback {
            joint_arrival_ms: 900,
            health_arrival_ms: 500,
            endpoint_arrival_ms: 950,
            ..Default::default()
        };
        assert_eq!(fb.max_arrival_age_ms(1_000), 500);
    }

    #[test]
    fn clear_vectors_empties_everything() {
        let mut fb = RobotFeedback {
            joint_position: vec![0.0; 6],
            joint_velocity: vec![0.0; 6],
            joint_effort: vec![0.0; 6],
            endpoint_pose: vec![0.0; 7],
            endpoint_velocity: vec![0.0; 6],
            ..Default::default()
        };
        fb.clear_vectors();
        assert!(fb.joint_position.is_empty());
        assert!(fb.joint_velocity.is_empty());
        assert!(fb.joint_effort.is_empty());
        assert!(fb.endpoint_pose.is_empty());
        assert!(fb.endpoint_velocity.is_empty());
    }
}
