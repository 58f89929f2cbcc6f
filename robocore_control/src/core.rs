//! `RobotController` — the root handle tying the control loop, the
//! controller mutex, and the publish channels together (§2, §5).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;
use robocore_common::config::RobotConfig;
use robocore_common::feedback::RobotFeedback;
use robocore_common::state::ControllerState;
use robocore_common::telemetry::{AdvancedRobotState, RobotState, RobotStateSensorData};
use robocore_common::wire::{ClientEndpointId, WireCmdState, WireCommandPayload};
use tokio::sync::{mpsc, watch};

use crate::clock::Clock;
use crate::command::{fill_robot_command, JogState, MultiplexerInputs};
use crate::cycle::{rt_setup, CycleBody, CycleRunner, TickStats};
use crate::publish::fill_states;
use crate::transport::{EndpointHealth, RobotTransport};
use crate::trajectory::TrajectoryQueue;
use crate::verify::{verify_communication, verify_robot_state};

pub(crate) type WireSlot = Option<(ClientEndpointId, WireCommandPayload)>;

/// Everything the control loop mutates each tick, behind the single
/// controller-scoped mutex (§5).
pub(crate) struct ControllerInner {
    pub state: ControllerState,
    pub feedback: RobotFeedback,
    pub jog: JogState,
    pub position_wire: WireCmdState,
    pub velocity_wire: WireCmdState,
    pub trajectories: TrajectoryQueue,
    pub next_trajectory_id: u64,
}

/// The mutex-protected state plus every external collaborator and publish
/// channel (§5, §6). `api.rs` is built entirely on top of this.
pub struct ControllerShared {
    pub(crate) inner: Mutex<ControllerInner>,
    pub(crate) config: RobotConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) transport: Arc<dyn RobotTransport>,
    pub(crate) endpoint_health: Arc<dyn EndpointHealth>,

    pub(crate) position_command_tx: watch::Sender<WireSlot>,
    pub(crate) position_command_rx: watch::Receiver<WireSlot>,
    pub(crate) velocity_command_tx: watch::Sender<WireSlot>,
    pub(crate) velocity_command_rx: watch::Receiver<WireSlot>,

    pub(crate) robot_state_tx: watch::Sender<Option<RobotState>>,
    pub(crate) advanced_state_tx: watch::Sender<Option<AdvancedRobotState>>,
    pub(crate) sensor_data_tx: mpsc::Sender<RobotStateSensorData>,
}

/// Subscriber handles for the three publish channels (§4.4), returned once
/// from [`RobotController::start`].
pub struct ControllerHandles {
    pub robot_state: watch::Receiver<Option<RobotState>>,
    pub advanced_robot_state: watch::Receiver<Option<AdvancedRobotState>>,
    pub robot_state_sensor_data: mpsc::Receiver<RobotStateSensorData>,
}

/// The control core's root handle (§2 `RobotController`).
///
/// Owns the dedicated control-loop thread (§4.1); dropping it stops the
/// loop and joins the thread.
pub struct RobotController {
    pub(crate) shared: Arc<ControllerShared>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl RobotController {
    /// Construct the controller and start its dedicated control-loop
    /// thread (§4.1). Returns the controller handle plus the publish
    /// channel receivers.
    pub fn start(
        config: RobotConfig,
        clock: Arc<dyn Clock>,
        transport: Arc<dyn RobotTransport>,
        endpoint_health: Arc<dyn EndpointHealth>,
    ) -> (Self, ControllerHandles) {
        let inner = ControllerInner {
            state: ControllerState::default(),
            feedback: RobotFeedback::default(),
            jog: JogState::default(),
            position_wire: WireCmdState::default(),
            velocity_wire: WireCmdState::default(),
            trajectories: TrajectoryQueue::default(),
            next_trajectory_id: 1,
        };

        let (position_command_tx, position_command_rx) = watch::channel(None);
        let (velocity_command_tx, velocity_command_rx) = watch::channel(None);
        let (robot_state_tx, robot_state_rx) = watch::channel(None);
        let (advanced_state_tx, advanced_state_rx) = watch::channel(None);
        let (sensor_data_tx, sensor_data_rx) = mpsc::channel(3);

        let period = Duration::from_millis(config.tick_period_ms);

        let shared = Arc::new(ControllerShared {
            inner: Mutex::new(inner),
            config,
            clock,
            transport,
            endpoint_health,
            position_command_tx,
            position_command_rx,
            velocity_command_tx,
            velocity_command_rx,
            robot_state_tx,
            advanced_state_tx,
            sensor_data_tx,
        });

        let stop = Arc::new(AtomicBool::new(false));
        let loop_shared = Arc::clone(&shared);
        let loop_stop = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("robocore-control-loop".to_string())
            .spawn(move || {
                if let Err(e) = rt_setup() {
                    tracing::warn!(error = %e, "rt_setup failed, continuing without RT scheduling");
                }
                let body = ControllerTick::new(loop_shared);
                let mut runner = CycleRunner::new(period);
                runner.run(body, move || loop_stop.load(Ordering::Relaxed));
            })
            .expect("failed to spawn control loop thread");

        let controller = RobotController {
            shared: Arc::clone(&shared),
            stop,
            thread: Some(thread),
        };
        let handles = ControllerHandles {
            robot_state: robot_state_rx,
            advanced_robot_state: advanced_state_rx,
            robot_state_sensor_data: sensor_data_rx,
        };
        (controller, handles)
    }

    /// Stop the control loop and join its thread. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RobotController {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Runs entirely on the dedicated control-loop thread (§4.1). Owns a
/// minimal current-thread `tokio` runtime purely to drive the async
/// `RobotTransport` calls synchronously within the tick — the transport
/// contract requires non-blocking implementations, so this never stalls
/// the loop (SPEC_FULL.md §F).
struct ControllerTick {
    shared: Arc<ControllerShared>,
    rt: tokio::runtime::Runtime,
}

impl ControllerTick {
    fn new(shared: Arc<ControllerShared>) -> Self {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("failed to build control-loop transport runtime");
        Self { shared, rt }
    }
}

impl CycleBody for ControllerTick {
    fn run_tick(&mut self) {
        let now_ms = self.shared.clock.now_ms();
        let _span = tracing::trace_span!("tick", now_ms).entered();
        let position_latest = self.shared.position_command_rx.borrow().clone();
        let velocity_latest = self.shared.velocity_command_rx.borrow().clone();

        let (robot_state, advanced_state, sensor_data, pos_cmd, vel_cmd) = {
            let mut inner = self.shared.inner.lock();

            // §4.1 ordering: bump state_seqno first, so the multiplexer's
            // wire-staleness check (and this tick's published snapshots)
            // compare against the seqno this tick actually publishes, not
            // the previous one.
            inner.state.state_seqno = inner.state.state_seqno.wrapping_add(1);

            let comm_ok = verify_communication(
                &mut inner.state,
                &mut inner.feedback,
                &self.shared.config,
                now_ms,
            );
            let state_ok = comm_ok && verify_robot_state(&mut inner.state);

            let current_joint_position = inner.feedback.joint_position.clone();
            let outputs = if state_ok {
                let ControllerInner {
                    state,
                    jog,
                    position_wire,
                    velocity_wire,
                    trajectories,
                    ..
                } = &mut *inner;
                fill_robot_command(
                    state,
                    jog,
                    position_wire,
                    velocity_wire,
                    trajectories,
                    &self.shared.config,
                    MultiplexerInputs {
                        now_ms,
                        current_joint_position: &current_joint_position,
                        position_latest: position_latest.as_ref(),
                        velocity_latest: velocity_latest.as_ref(),
                    },
                )
            } else {
                // fill_robot_command (and its begin_tick reset) never ran
                // this tick, so clear the sent flags explicitly — no wire
                // payload can have been accepted while not state_ok.
                inner.position_wire.begin_tick();
                inner.velocity_wire.begin_tick();
                Default::default()
            };

            tracing::trace!(state_seqno = inner.state.state_seqno, command_mode = ?inner.state.command_mode, "tick complete");

            let (robot_state, advanced_state, sensor_data) = fill_states(
                &inner.state,
                &inner.feedback,
                &self.shared.config,
                outputs.position_command.as_deref(),
                outputs.velocity_command.as_deref(),
                outputs.trajectory_running,
                inner.position_wire.sent_this_tick,
                inner.velocity_wire.sent_this_tick,
                now_ms,
            );

            (
                robot_state,
                advanced_state,
                sensor_data,
                outputs.position_command,
                outputs.velocity_command,
            )
        };

        let _ = self.shared.robot_state_tx.send(Some(robot_state));
        let _ = self.shared.advanced_state_tx.send(Some(advanced_state));
        // Lossy pipe (§4.4, bounded 3): a full buffer means a slow
        // consumer, and the newest frame is simply dropped rather than
        // blocking the loop.
        let _ = self.shared.sensor_data_tx.try_send(sensor_data);

        let transport = Arc::clone(&self.shared.transport);
        self.rt
            .block_on(transport.send_robot_command(now_ms, pos_cmd.as_deref(), vel_cmd.as_deref()));
    }
}
