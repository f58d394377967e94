//! Zumo Pilot - Differential-drive waypoint tracking
//!
//! This library provides the motion core of a small differential-drive robot:
//! dead-reckoning odometry from wheel encoders, a waypoint path tracker with an
//! acceleration-limited speed profile, and a per-wheel PI speed loop producing
//! saturated motor commands.
//!
//! Hardware is reached only through the [`hardware::EncoderSource`] and
//! [`hardware::MotorDriver`] traits, so the whole pipeline runs against
//! [`hardware::SimulatedZumo`] or a mock as readily as against a real robot.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod config;
pub mod core;
pub mod drive;
pub mod error;
pub mod hardware;
pub mod navigation;

// Re-export commonly used items for easier access
pub use config::{RobotGeometry, SimulationConfig, TrackerConfig, WheelControllerConfig, ZumoConfig};
pub use self::core::{MotorState, Odometry, Pose, TrackingPhase, WheelKinematics};
pub use drive::{DriveSystem, Telemetry};
pub use error::{Result, ZumoError};
pub use hardware::{EncoderDeltas, EncoderSource, MotorDriver, SimulatedZumo};
pub use navigation::{ControllerState, MotorCommand, PathState, PathTracker};
