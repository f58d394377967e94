//! Waypoint tracking for Zumo Pilot
//!
//! This module turns the current pose and a waypoint sequence into per-wheel
//! motor commands. Each tick measures heading and cross-track errors against the
//! segment leading into the current waypoint, advances the waypoint cursor,
//! shapes the forward speed and closes the wheel-speed loop.
//!
//! All state that survives between ticks lives in [`ControllerState`], which the
//! caller owns and lends to [`PathTracker::tick`]. The tracker itself only holds
//! configuration.

pub mod controller;
pub mod path;
pub mod profile;

use std::time::Duration;

use log::{debug, info, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::config::{TrackerConfig, WheelControllerConfig};
use crate::core::{MotorState, Pose, TrackingPhase, WheelKinematics};
use crate::error::{Result, ZumoError};

pub use controller::{MotorCommand, PidState, WheelSpeedController, WheelTargets};
pub use path::SegmentGeometry;
pub use profile::VelocityProfile;

/// Per-tick path tracking errors and commanded speed
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PathState {
    /// Index of the waypoint being pursued
    pub curr_point: usize,
    /// Cross-track error (mm)
    pub de: f64,
    /// Remaining path distance (mm)
    pub dist: f64,
    /// Heading deviation from the path direction (rad)
    pub theta_t: f64,
    /// Commanded forward speed (mm/s)
    pub v_forward: f64,
}

/// Everything the tracker carries from one tick to the next
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerState {
    /// Tracking errors from the last tick
    pub path: PathState,
    /// Wheel loop accumulators
    pub pid: PidState,
    /// Forward speed commanded on the previous tick (mm/s)
    pub prev_v_forward: f64,
    /// Wheel targets from the last tick (mm/s)
    pub targets: WheelTargets,
    /// Last emitted command
    pub command: MotorCommand,
    /// Whether the final waypoint has been reached
    pub stopped: bool,
}

impl ControllerState {
    /// Fresh state, as after construction
    pub fn new() -> Self {
        ControllerState::default()
    }

    /// Restores every accumulator and the waypoint cursor in one assignment
    pub fn reset(&mut self) {
        *self = ControllerState::default();
    }

    /// Current tracking phase
    pub fn phase(&self) -> TrackingPhase {
        if self.stopped {
            TrackingPhase::Stopped
        } else {
            TrackingPhase::Tracking(self.path.curr_point)
        }
    }

    /// Idle/moving flag of the last command
    pub fn motor_state(&self) -> MotorState {
        self.command.motor_state()
    }

    fn halt(&mut self) -> MotorCommand {
        self.path.v_forward = 0.0;
        self.path.theta_t = 0.0;
        self.prev_v_forward = 0.0;
        self.targets = WheelTargets::default();
        self.command = MotorCommand::STOP;
        self.command
    }
}

/// Waypoint tracking controller
#[derive(Debug, Clone)]
pub struct PathTracker {
    config: TrackerConfig,
    profile: VelocityProfile,
    wheel_controller: WheelSpeedController,
}

impl PathTracker {
    /// Creates a tracker from its configuration
    pub fn new(tracker: &TrackerConfig, wheel: &WheelControllerConfig) -> Self {
        PathTracker {
            config: tracker.clone(),
            profile: VelocityProfile::new(tracker.max_acceleration, tracker.max_forward_speed),
            wheel_controller: WheelSpeedController::new(wheel),
        }
    }

    /// Runs one control tick.
    ///
    /// `pose` and `wheels` must already include this tick's encoder deltas, and
    /// `dt` is the elapsed time they were measured over. Fails only on an empty
    /// waypoint sequence, in which case `state` is left untouched.
    pub fn tick(
        &self,
        state: &mut ControllerState,
        pose: &Pose,
        wheels: &WheelKinematics,
        waypoints: &[Point2<f64>],
        dt: Duration,
    ) -> Result<MotorCommand> {
        if waypoints.is_empty() {
            return Err(ZumoError::EmptyPath);
        }
        let last = waypoints.len() - 1;
        if state.path.curr_point > last {
            state.path.curr_point = last;
        }
        if state.stopped {
            return Ok(state.halt());
        }

        let index = state.path.curr_point;
        let geometry = SegmentGeometry::measure(waypoints, index, pose);

        match (
            geometry.cross_track_error(self.config.min_path_norm),
            geometry.heading_deviation(self.config.min_path_norm, self.config.parallel_threshold),
        ) {
            (Some(de), Some(theta_t)) => {
                state.path.de = de;
                state.path.theta_t = theta_t;
            }
            _ => warn!(
                "Segment into waypoint {} has no direction; holding de={:.3}, theta_t={:.3}",
                index, state.path.de, state.path.theta_t
            ),
        }

        state.path.dist = geometry.dist_to_target;
        if index < last {
            state.path.dist += path::remaining_length(waypoints, index);
            if path::should_advance(
                waypoints,
                index,
                &pose.position(),
                geometry.dist_to_target,
                self.config.pass_distance,
            ) {
                state.path.curr_point = index + 1;
                info!(
                    "Advancing to waypoint {} of {} at ({:.1}, {:.1})",
                    index + 1,
                    waypoints.len(),
                    pose.x,
                    pose.y
                );
            }
        } else if self.reached_goal(&geometry) {
            state.stopped = true;
            info!(
                "Final waypoint reached at ({:.1}, {:.1}), {:.1} mm from target",
                pose.x, pose.y, geometry.dist_to_target
            );
            return Ok(state.halt());
        }

        let v_forward =
            self.profile
                .shape(state.path.dist, state.prev_v_forward, dt.as_secs_f64());
        state.path.v_forward = v_forward;
        state.prev_v_forward = v_forward;

        let steering = state.path.theta_t * self.config.kp_theta + state.path.de * self.config.kp_de;
        state.targets = WheelTargets::mix(v_forward, steering);
        state.command = self
            .wheel_controller
            .compute(&mut state.pid, state.targets, *wheels);

        debug!(
            "Tick: point={} de={:.2} dist={:.2} theta_t={:.3} v={:.2} cmd=({}, {})",
            state.path.curr_point,
            state.path.de,
            state.path.dist,
            state.path.theta_t,
            state.path.v_forward,
            state.command.left,
            state.command.right
        );

        Ok(state.command)
    }

    /// Stop test for the final waypoint: inside the stop radius, or the target
    /// has fallen behind the robot.
    fn reached_goal(&self, geometry: &SegmentGeometry) -> bool {
        if geometry.dist_to_target < self.config.stop_distance {
            return true;
        }
        geometry
            .target_cosine()
            .is_some_and(|cosine| cosine < self.config.overshoot_cosine)
    }

    /// Forward speed limit (mm/s)
    pub fn max_forward_speed(&self) -> f64 {
        self.profile.max_speed()
    }

    /// Command saturation bound
    pub fn saturation(&self) -> i32 {
        self.wheel_controller.saturation()
    }
}
