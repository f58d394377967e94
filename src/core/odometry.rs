// core/odometry.rs

// Dead-reckoning pose estimation from incremental wheel encoder counts.
// Each update converts the left/right pulse deltas into wheel travel, integrates the
// pose at the midpoint heading, and derives wheel speeds from the elapsed time.

use std::time::Duration;

use log::warn;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::config::RobotGeometry;

/// Robot pose: position in millimetres, heading in radians
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,     // X position (mm)
    pub y: f64,     // Y position (mm)
    pub theta: f64, // Heading (rad), accumulated without wrapping
}

/// Instantaneous wheel speeds from the last update (mm/s)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelKinematics {
    pub v_left: f64,
    pub v_right: f64,
}

impl Pose {
    /// Creates a pose
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Pose { x, y, theta }
    }

    /// Position as a point
    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Unit heading vector
    pub fn heading(&self) -> Vector2<f64> {
        Vector2::new(self.theta.cos(), self.theta.sin())
    }
}

/// Differential-drive odometry integrator
#[derive(Debug, Clone)]
pub struct Odometry {
    mm_per_pulse: f64,
    wheel_base: f64,
    pose: Pose,
    wheels: WheelKinematics,
}

impl Odometry {
    /// Creates an integrator at the origin
    pub fn new(geometry: &RobotGeometry) -> Self {
        Odometry {
            mm_per_pulse: geometry.mm_per_pulse(),
            wheel_base: geometry.wheel_base,
            pose: Pose::default(),
            wheels: WheelKinematics::default(),
        }
    }

    /// Integrates one tick of encoder deltas.
    ///
    /// A zero `elapsed` leaves pose and wheel speeds untouched.
    pub fn update(&mut self, delta_left: i32, delta_right: i32, elapsed: Duration) -> Pose {
        if elapsed.is_zero() {
            warn!(
                "Odometry update skipped: zero elapsed time (deltas left={}, right={})",
                delta_left, delta_right
            );
            return self.pose;
        }
        let dt = elapsed.as_secs_f64();

        let dx_left = f64::from(delta_left) * self.mm_per_pulse;
        let dx_right = f64::from(delta_right) * self.mm_per_pulse;

        self.wheels = WheelKinematics {
            v_left: dx_left / dt,
            v_right: dx_right / dt,
        };

        let d_theta = (dx_right - dx_left) / self.wheel_base;
        let d_center = (dx_right + dx_left) / 2.0;

        // Midpoint integration
        let mid_theta = self.pose.theta + d_theta / 2.0;
        self.pose.x += d_center * mid_theta.cos();
        self.pose.y += d_center * mid_theta.sin();
        self.pose.theta += d_theta;

        self.pose
    }

    /// Zeroes pose and wheel speeds. Geometry is kept.
    pub fn reset(&mut self) {
        self.pose = Pose::default();
        self.wheels = WheelKinematics::default();
    }

    /// Current pose estimate
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Wheel speeds from the last update
    pub fn wheels(&self) -> WheelKinematics {
        self.wheels
    }

    /// Linear travel per encoder pulse (mm)
    pub fn mm_per_pulse(&self) -> f64 {
        self.mm_per_pulse
    }
}

/// Signed difference between two readings of a wrapping 16-bit encoder counter
pub fn wrapping_delta(previous: u16, current: u16) -> i32 {
    i32::from(current.wrapping_sub(previous) as i16)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(10);

    fn odometry() -> Odometry {
        Odometry::new(&RobotGeometry::default())
    }

    #[test]
    fn straight_line_keeps_heading() {
        let mut odom = odometry();
        let step = 10.0 * odom.mm_per_pulse();
        for _ in 0..50 {
            odom.update(10, 10, TICK);
        }
        let pose = odom.pose();
        assert_eq!(pose.theta, 0.0);
        assert!((pose.x - 50.0 * step).abs() < 1e-9);
        assert!(pose.y.abs() < 1e-12);
    }

    #[test]
    fn pure_rotation_keeps_position() {
        let mut odom = odometry();
        let displacement = 5.0 * odom.mm_per_pulse();
        for tick in 1..=20 {
            odom.update(-5, 5, TICK);
            let expected = tick as f64 * 2.0 * displacement / 98.0;
            assert!((odom.pose().theta - expected).abs() < 1e-12);
        }
        assert!(odom.pose().x.abs() < 1e-12);
        assert!(odom.pose().y.abs() < 1e-12);
    }

    #[test]
    fn arc_uses_midpoint_heading() {
        let mut odom = odometry();
        odom.update(0, 100, TICK);
        let dx_right = 100.0 * odom.mm_per_pulse();
        let d_theta = dx_right / 98.0;
        let d_center = dx_right / 2.0;
        let pose = odom.pose();
        assert!((pose.x - d_center * (d_theta / 2.0).cos()).abs() < 1e-12);
        assert!((pose.y - d_center * (d_theta / 2.0).sin()).abs() < 1e-12);
        assert!((pose.theta - d_theta).abs() < 1e-12);
    }

    #[test]
    fn velocities_divide_by_elapsed_time() {
        let mut odom = odometry();
        odom.update(-3, 7, Duration::from_micros(20_000));
        let wheels = odom.wheels();
        assert!((wheels.v_left - (-3.0 * odom.mm_per_pulse() / 0.02)).abs() < 1e-9);
        assert!((wheels.v_right - (7.0 * odom.mm_per_pulse() / 0.02)).abs() < 1e-9);
    }

    #[test]
    fn zero_elapsed_skips_update() {
        let mut odom = odometry();
        odom.update(10, 12, TICK);
        let before = (odom.pose(), odom.wheels());
        odom.update(400, -400, Duration::ZERO);
        assert_eq!((odom.pose(), odom.wheels()), before);
    }

    #[test]
    fn reset_zeroes_state_but_keeps_geometry() {
        let mut odom = odometry();
        let scale = odom.mm_per_pulse();
        odom.update(30, 45, TICK);
        odom.reset();
        assert_eq!(odom.pose(), Pose::default());
        assert_eq!(odom.wheels(), WheelKinematics::default());
        assert_eq!(odom.mm_per_pulse(), scale);
    }

    #[test]
    fn wrapping_delta_crosses_counter_limits() {
        assert_eq!(wrapping_delta(65_530, 4), 10);
        assert_eq!(wrapping_delta(4, 65_530), -10);
        assert_eq!(wrapping_delta(100, 100), 0);
    }
}
