// src/drive.rs

//! Control-cycle orchestration
//!
//! [`DriveSystem`] owns odometry, tracker state and the injected hardware, and
//! runs the per-tick pipeline in a fixed order: read encoders, integrate
//! odometry, track the path, emit the motor command.

use std::time::Duration;

use log::info;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::config::ZumoConfig;
use crate::core::{MotorState, Odometry, TrackingPhase};
use crate::error::{Result, ZumoError};
use crate::hardware::{EncoderSource, MotorDriver};
use crate::navigation::{ControllerState, MotorCommand, PathTracker};

/// Read-only snapshot for logging and plotting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// X position (mm)
    #[serde(rename = "X")]
    pub x: f64,
    /// Y position (mm)
    #[serde(rename = "Y")]
    pub y: f64,
    /// Heading (rad)
    #[serde(rename = "Theta")]
    pub theta: f64,
    /// Left wheel speed (mm/s)
    #[serde(rename = "vL")]
    pub v_left: f64,
    /// Right wheel speed (mm/s)
    #[serde(rename = "vR")]
    pub v_right: f64,
    /// Idle/moving flag of the last command
    pub motor_state: MotorState,
    /// Waypoint being pursued
    pub curr_point: usize,
    /// Cross-track error (mm)
    pub de: f64,
    /// Remaining distance (mm)
    pub dist: f64,
    /// Heading deviation (rad)
    pub theta_t: f64,
    /// Commanded forward speed (mm/s)
    pub v_forward: f64,
    /// Last motor command
    pub command: MotorCommand,
}

/// Full odometry-to-motor pipeline around injected hardware
pub struct DriveSystem<H> {
    odometry: Odometry,
    tracker: PathTracker,
    state: ControllerState,
    waypoints: Vec<Point2<f64>>,
    hardware: H,
}

impl<H: EncoderSource + MotorDriver> DriveSystem<H> {
    /// Builds the pipeline from a validated configuration
    pub fn new(config: &ZumoConfig, hardware: H) -> Result<Self> {
        config.validate()?;
        Ok(DriveSystem {
            odometry: Odometry::new(&config.robot),
            tracker: PathTracker::new(&config.tracker, &config.wheel_controller),
            state: ControllerState::new(),
            waypoints: config.waypoint_points(),
            hardware,
        })
    }

    /// Runs one control tick over `elapsed`
    pub fn run_cycle(&mut self, elapsed: Duration) -> Result<MotorCommand> {
        let deltas = self.hardware.read_deltas()?;
        self.odometry.update(deltas.left, deltas.right, elapsed);

        let pose = self.odometry.pose();
        let wheels = self.odometry.wheels();
        let command = self
            .tracker
            .tick(&mut self.state, &pose, &wheels, &self.waypoints, elapsed)?;

        self.hardware.set_speeds(command)?;
        Ok(command)
    }

    /// Replaces the waypoint sequence and restarts tracking from its first point.
    /// Pose is kept.
    pub fn set_waypoints(&mut self, waypoints: Vec<Point2<f64>>) -> Result<()> {
        if waypoints.is_empty() {
            return Err(ZumoError::EmptyPath);
        }
        info!("Loaded path with {} waypoints", waypoints.len());
        self.waypoints = waypoints;
        self.state.reset();
        Ok(())
    }

    /// Returns pose, wheel speeds and every controller accumulator to their
    /// construction values
    pub fn reset(&mut self) {
        self.odometry.reset();
        self.state.reset();
        info!("Drive system reset");
    }

    /// Commands the motors to stop without touching tracker state
    pub fn halt(&mut self) -> Result<()> {
        self.hardware.set_speeds(MotorCommand::STOP)
    }

    /// Current snapshot
    pub fn telemetry(&self) -> Telemetry {
        let pose = self.odometry.pose();
        let wheels = self.odometry.wheels();
        let path = self.state.path;
        Telemetry {
            x: pose.x,
            y: pose.y,
            theta: pose.theta,
            v_left: wheels.v_left,
            v_right: wheels.v_right,
            motor_state: self.state.motor_state(),
            curr_point: path.curr_point,
            de: path.de,
            dist: path.dist,
            theta_t: path.theta_t,
            v_forward: path.v_forward,
            command: self.state.command,
        }
    }

    /// True once the final waypoint has been reached
    pub fn is_stopped(&self) -> bool {
        self.state.phase() == TrackingPhase::Stopped
    }

    /// Tracker state
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Waypoint sequence being tracked
    pub fn waypoints(&self) -> &[Point2<f64>] {
        &self.waypoints
    }

    /// Injected hardware, mutably
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }
}
