//! Jog mode: a bounded per-joint step with a completion promise (§4.3, §4.6).

use robocore_common::config::RobotConfig;
use robocore_common::error::ApiError;
use robocore_common::units::PositionUnits;
use tokio::sync::oneshot;

/// Mutable jog bookkeeping (§3 `JogState`).
///
/// Lives behind the controller mutex; `PublicAPI::jog_joint` installs a
/// target and a completion sender, `evaluate_jog` (called from the
/// multiplexer every tick) resolves it.
#[derive(Default)]
pub struct JogState {
    target: Option<Vec<f64>>,
    /// Per-tick step bound, in rad/s; 0 means unbounded (command the
    /// target outright, as a single step).
    max_vel_rad_s: f64,
    last_jog_command_ms: i64,
    completion: Option<oneshot::Sender<Result<(), ApiError>>>,
}

impl JogState {
    /// Install a new jog target, failing any jog still pending (§4.6: "a
    /// new jog target supersedes a pending one, failing its promise with
    /// `aborted`").
    pub fn set_target(
        &mut self,
        target: Vec<f64>,
        max_vel_rad_s: f64,
        now_ms: i64,
        completion: oneshot::Sender<Result<(), ApiError>>,
    ) {
        self.fail_pending(ApiError::aborted("superseded by a newer jog target"));
        self.target = Some(target);
        self.max_vel_rad_s = max_vel_rad_s;
        self.last_jog_command_ms = now_ms;
        self.completion = Some(completion);
    }

    /// Fail and drop any pending jog (mode change away from `Jog`, §4.3).
    pub fn clear(&mut self, reason: ApiError) {
        self.fail_pending(reason);
        self.target = None;
    }

    fn fail_pending(&mut self, reason: ApiError) {
        if let Some(tx) = self.completion.take() {
            let _ = tx.send(Err(reason));
        }
    }

    fn succeed_pending(&mut self) {
        if let Some(tx) = self.completion.take() {
            let _ = tx.send(Ok(()));
        }
    }
}

/// §4.3 per-tick jog evaluation.
///
/// Returns the joint-position command to emit this tick, or `None` if the
/// jog completed, timed out, or there is no pending target.
pub fn evaluate_jog(
    jog: &mut JogState,
    current_joint_position: &[f64],
    config: &RobotConfig,
    now_ms: i64,
) -> Option<Vec<f64>> {
    let target = jog.target.clone()?;

    if now_ms - jog.last_jog_command_ms > config.jog_joint_timeout_ms as i64 {
        jog.fail_pending(ApiError::failed("jog timed out before reaching tolerance"));
        jog.target = None;
        return None;
    }

    let tol_rad = PositionUnits::Degree.to_radians(config.jog_joint_tol_deg);
    if current_joint_position.len() == target.len()
        && current_joint_position
            .iter()
            .zip(target.iter())
            .all(|(current, want)| (current - want).abs() <= tol_rad)
    {
        jog.succeed_pending();
        jog.target = None;
        return None;
    }

    if jog.max_vel_rad_s > 0.0 && current_joint_position.len() == target.len() {
        let max_step = jog.max_vel_rad_s * (config.tick_period_ms as f64 / 1000.0);
        let stepped = current_joint_position
            .iter()
            .zip(target.iter())
            .map(|(current, want)| current + (want - current).clamp(-max_step, max_step))
            .collect();
        return Some(stepped);
    }

    Some(target)
}
