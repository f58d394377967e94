// src/main.rs
// Demo entry point: drives the simulated Zumo along the configured waypoints and
// logs telemetry until the robot stops or the tick limit runs out.
//
// Usage: zumo_pilot [config.yaml]
// Set RUST_LOG=info (or debug) to see the output.

use std::error::Error;
use std::time::Duration;

use log::{error, info, warn};
use zumo_pilot::{DriveSystem, SimulatedZumo, ZumoConfig};

/// Loads configuration, runs the closed loop, reports the final pose.
fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging for debugging
    env_logger::init();
    info!("Starting Zumo Pilot simulation...");

    let config = match std::env::args().nth(1) {
        Some(path) => ZumoConfig::load(&path)?,
        None => {
            info!("No configuration file given, using defaults");
            ZumoConfig::default()
        }
    };

    let tick = Duration::from_millis(config.tick_period_ms);
    let robot = SimulatedZumo::new(
        &config.robot,
        &config.simulation,
        config.wheel_controller.saturation,
    );
    let mut system = DriveSystem::new(&config, robot)?;
    info!(
        "Tracking {} waypoints with a {} ms tick",
        system.waypoints().len(),
        config.tick_period_ms
    );

    let mut ticks = 0;
    while ticks < config.simulation.max_ticks && !system.is_stopped() {
        system.hardware_mut().step(tick);
        if let Err(e) = system.run_cycle(tick) {
            error!("Control cycle failed: {}", e);
            system.halt()?;
            return Err(e.into());
        }

        ticks += 1;
        if ticks % 50 == 0 {
            let t = system.telemetry();
            info!(
                "t={:.2}s pos=({:.1}, {:.1}) theta={:.3} point={} v={:.1} cmd=({}, {})",
                ticks as f64 * tick.as_secs_f64(),
                t.x,
                t.y,
                t.theta,
                t.curr_point,
                t.v_forward,
                t.command.left,
                t.command.right
            );
        }
    }

    let t = system.telemetry();
    if system.is_stopped() {
        info!(
            "Stopped after {} ticks at ({:.1}, {:.1}), heading {:.3} rad",
            ticks, t.x, t.y, t.theta
        );
    } else {
        warn!("Tick limit reached before the final waypoint; halting motors");
        system.halt()?;
    }

    Ok(())
}
