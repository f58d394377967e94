// src/config.rs

//! Configuration for Zumo Pilot
//!
//! All constants the controller needs are supplied here at construction time.
//! Values load from YAML with `serde_yaml`; any section left out of the file
//! falls back to the reference Zumo robot defaults.

use std::path::Path;

use log::info;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ZumoError};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZumoConfig {
    /// Wheel and encoder geometry
    pub robot: RobotGeometry,
    /// Path tracker gains and thresholds
    pub tracker: TrackerConfig,
    /// Per-wheel speed loop
    pub wheel_controller: WheelControllerConfig,
    /// Simulated plant used by the demo binary
    pub simulation: SimulationConfig,
    /// Control tick period in milliseconds
    pub tick_period_ms: u64,
    /// Waypoints in millimetres, in traversal order
    pub waypoints: Vec<[f64; 2]>,
}

/// Physical robot geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotGeometry {
    /// Wheel diameter (mm)
    pub wheel_diameter: f64,
    /// Motor gearbox ratio
    pub gear_ratio: f64,
    /// Encoder pulses per motor revolution
    pub pulses_per_rev: f64,
    /// Distance between the wheel contact points (mm)
    pub wheel_base: f64,
}

/// Path tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum forward acceleration (mm/s^2)
    pub max_acceleration: f64,
    /// Maximum forward speed (mm/s)
    pub max_forward_speed: f64,
    /// Steering gain on heading deviation (mm/s per rad)
    pub kp_theta: f64,
    /// Steering gain on cross-track error (1/s)
    pub kp_de: f64,
    /// Advance to the next waypoint inside this radius (mm)
    pub pass_distance: f64,
    /// Stop at the final waypoint inside this radius (mm)
    pub stop_distance: f64,
    /// Cosine between heading and target below which the final target counts as behind
    pub overshoot_cosine: f64,
    /// Path-direction vectors shorter than this carry no direction (mm)
    pub min_path_norm: f64,
    /// Cross products below this magnitude are treated as parallel
    pub parallel_threshold: f64,
}

/// Wheel-speed PI controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelControllerConfig {
    /// Proportional gain
    pub kp: f64,
    /// Integral gain, applied to the raw per-tick error sum
    pub ki: f64,
    /// Symmetric motor command bound
    pub saturation: i32,
    /// Optional clamp on each integral accumulator. `None` leaves it unbounded.
    pub integral_limit: Option<f64>,
}

/// First-order wheel plant used by [`crate::hardware::SimulatedZumo`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Steady-state wheel speed per motor command unit (mm/s)
    pub speed_per_command: f64,
    /// Motor time constant (s)
    pub time_constant: f64,
    /// Stop the demo after this many ticks
    pub max_ticks: u32,
}

impl Default for ZumoConfig {
    fn default() -> Self {
        ZumoConfig {
            robot: RobotGeometry::default(),
            tracker: TrackerConfig::default(),
            wheel_controller: WheelControllerConfig::default(),
            simulation: SimulationConfig::default(),
            tick_period_ms: 10,
            waypoints: vec![[300.0, 0.0], [300.0, 300.0], [0.0, 300.0]],
        }
    }
}

impl Default for RobotGeometry {
    fn default() -> Self {
        RobotGeometry {
            wheel_diameter: 39.0,
            gear_ratio: 75.0,
            pulses_per_rev: 12.0,
            wheel_base: 98.0,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            max_acceleration: 200.0,
            max_forward_speed: 100.0,
            kp_theta: 100.0,
            kp_de: 1.0,
            pass_distance: 50.0,
            stop_distance: 25.0,
            overshoot_cosine: -0.1,
            min_path_norm: 1e-6,
            parallel_threshold: 1e-3,
        }
    }
}

impl Default for WheelControllerConfig {
    fn default() -> Self {
        WheelControllerConfig {
            kp: 1.0,
            ki: 0.1,
            saturation: 400,
            integral_limit: None,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            speed_per_command: 1.5,
            time_constant: 0.05,
            max_ticks: 6000,
        }
    }
}

impl RobotGeometry {
    /// Linear wheel travel per encoder pulse (mm)
    pub fn mm_per_pulse(&self) -> f64 {
        std::f64::consts::PI * self.wheel_diameter / (self.pulses_per_rev * self.gear_ratio)
    }
}

impl ZumoConfig {
    /// Parse a configuration from YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: ZumoConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let config: ZumoConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Waypoints as points
    pub fn waypoint_points(&self) -> Vec<Point2<f64>> {
        self.waypoints.iter().map(|p| Point2::new(p[0], p[1])).collect()
    }

    /// Check every constant against its precondition
    pub fn validate(&self) -> Result<()> {
        let robot = &self.robot;
        require_positive("robot.wheel_diameter", robot.wheel_diameter)?;
        require_positive("robot.gear_ratio", robot.gear_ratio)?;
        require_positive("robot.pulses_per_rev", robot.pulses_per_rev)?;
        require_positive("robot.wheel_base", robot.wheel_base)?;

        let tracker = &self.tracker;
        require_positive("tracker.max_acceleration", tracker.max_acceleration)?;
        require_positive("tracker.max_forward_speed", tracker.max_forward_speed)?;
        require_non_negative("tracker.pass_distance", tracker.pass_distance)?;
        require_non_negative("tracker.stop_distance", tracker.stop_distance)?;
        require_positive("tracker.min_path_norm", tracker.min_path_norm)?;
        require_non_negative("tracker.parallel_threshold", tracker.parallel_threshold)?;
        if !(-1.0..=1.0).contains(&tracker.overshoot_cosine) {
            return Err(ZumoError::Config(format!(
                "tracker.overshoot_cosine must lie in [-1, 1], got {}",
                tracker.overshoot_cosine
            )));
        }

        let wheel = &self.wheel_controller;
        if wheel.saturation <= 0 {
            return Err(ZumoError::Config(format!(
                "wheel_controller.saturation must be positive, got {}",
                wheel.saturation
            )));
        }
        if let Some(limit) = wheel.integral_limit {
            require_non_negative("wheel_controller.integral_limit", limit)?;
        }

        require_positive("simulation.time_constant", self.simulation.time_constant)?;
        if self.tick_period_ms == 0 {
            return Err(ZumoError::Config("tick_period_ms must be non-zero".to_string()));
        }
        if self.waypoints.is_empty() {
            return Err(ZumoError::EmptyPath);
        }
        Ok(())
    }
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ZumoError::Config(format!("{} must be positive, got {}", name, value)))
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ZumoError::Config(format!("{} must be non-negative, got {}", name, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ZumoConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = ZumoConfig::from_yaml_str(
            "tracker:\n  max_forward_speed: 150.0\nwaypoints:\n  - [100.0, 0.0]\n",
        )
        .unwrap();
        assert_eq!(config.tracker.max_forward_speed, 150.0);
        assert_eq!(config.tracker.max_acceleration, 200.0);
        assert_eq!(config.wheel_controller.saturation, 400);
        assert_eq!(config.waypoints, vec![[100.0, 0.0]]);
    }

    #[test]
    fn zero_wheel_base_is_rejected() {
        let mut config = ZumoConfig::default();
        config.robot.wheel_base = 0.0;
        assert!(matches!(config.validate(), Err(ZumoError::Config(_))));
    }

    #[test]
    fn empty_waypoints_are_rejected() {
        let mut config = ZumoConfig::default();
        config.waypoints.clear();
        assert!(matches!(config.validate(), Err(ZumoError::EmptyPath)));
    }

    #[test]
    fn mm_per_pulse_matches_geometry() {
        let geometry = RobotGeometry::default();
        let expected = std::f64::consts::PI * 39.0 / 900.0;
        assert!((geometry.mm_per_pulse() - expected).abs() < 1e-12);
    }
}
