//! Bring-up entry point: loads configuration and starts tracing. Mirrors
//! `evo_control_unit::main`'s shape, minus the concrete transport the real
//! driver binary would wire in — that implementation lives outside this
//! crate (§1 "What this crate is NOT").

use std::path::PathBuf;

use robocore_control::config::load_config;

fn main() {
    println!("robocore_control bring-up");

    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("robot.toml"));

    match load_config(&path) {
        Ok(config) => {
            tracing::info!(
                joint_count = config.joint_count,
                tick_period_ms = config.tick_period_ms,
                "configuration loaded, awaiting a concrete transport/endpoint-health implementation to start RobotController::start"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, path = %path.display(), "failed to load configuration");
            std::process::exit(1);
        }
    }
}
