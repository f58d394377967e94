// core/mod.rs

// Pose estimation and discrete state shared by the navigation layer.

pub mod odometry;
pub mod state;

pub use odometry::{wrapping_delta, Odometry, Pose, WheelKinematics};
pub use state::{MotorState, TrackingPhase};
