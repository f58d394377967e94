// src/navigation/path.rs
// Waypoint-sequence geometry: the segment leading into the current target, the
// robot's errors relative to it, and the waypoint advancement test.

use nalgebra::{Point2, Vector2};

use crate::core::Pose;

/// Geometry of the robot against the segment leading into `waypoints[index]`
#[derive(Debug, Clone, Copy)]
pub struct SegmentGeometry {
    /// Target minus position (`Vt`)
    pub to_target: Vector2<f64>,
    /// Unit heading vector (`Vr`)
    pub heading: Vector2<f64>,
    /// Direction of the segment into the target (`Vd`)
    pub direction: Vector2<f64>,
    /// Straight-line distance to the target (mm)
    pub dist_to_target: f64,
}

impl SegmentGeometry {
    /// Measures the robot against the segment ending at `waypoints[index]`.
    ///
    /// `index` must be a valid waypoint index.
    pub fn measure(waypoints: &[Point2<f64>], index: usize, pose: &Pose) -> Self {
        let to_target = waypoints[index] - pose.position();
        SegmentGeometry {
            to_target,
            heading: pose.heading(),
            direction: path_direction(waypoints, index),
            dist_to_target: to_target.norm(),
        }
    }

    /// Signed perpendicular offset of the target from the robot across the
    /// segment direction. Positive when the path lies to the robot's left.
    ///
    /// `None` when the segment has no usable direction.
    pub fn cross_track_error(&self, min_norm: f64) -> Option<f64> {
        let norm = self.direction.norm();
        if norm < min_norm {
            return None;
        }
        Some(self.direction.perp(&self.to_target) / norm)
    }

    /// Signed angle from the robot heading to the segment direction.
    ///
    /// Near-parallel vectors resolve to 0 when aligned and pi/2 when reversed.
    /// `None` when the segment has no usable direction.
    pub fn heading_deviation(&self, min_norm: f64, parallel_threshold: f64) -> Option<f64> {
        let norm = self.direction.norm();
        if norm < min_norm {
            return None;
        }
        let cross = self.heading.perp(&self.direction);
        let cosine = (self.direction.dot(&self.heading) / norm).clamp(-1.0, 1.0);
        if cross.abs() < parallel_threshold {
            if cosine < 0.0 {
                Some(std::f64::consts::FRAC_PI_2)
            } else {
                Some(0.0)
            }
        } else {
            Some(cosine.acos() * cross.signum())
        }
    }

    /// Cosine between heading and the vector to the target.
    ///
    /// `None` when the robot sits exactly on the target.
    pub fn target_cosine(&self) -> Option<f64> {
        if self.dist_to_target > 0.0 {
            Some(self.to_target.dot(&self.heading) / self.dist_to_target)
        } else {
            None
        }
    }
}

/// Direction of the segment into `waypoints[index]`.
///
/// The first waypoint is reached along the line from the origin.
pub fn path_direction(waypoints: &[Point2<f64>], index: usize) -> Vector2<f64> {
    if index > 0 {
        waypoints[index] - waypoints[index - 1]
    } else {
        waypoints[0].coords
    }
}

/// Summed length of the segments after `waypoints[index]`
pub fn remaining_length(waypoints: &[Point2<f64>], index: usize) -> f64 {
    waypoints
        .iter()
        .skip(index)
        .zip(waypoints.iter().skip(index + 1))
        .map(|(from, to)| (to - from).norm())
        .sum()
}

/// Whether the tracker should move on from `waypoints[index]`.
///
/// True inside the pass radius, or when the following waypoint is already closer
/// than the current one. Always false on the final waypoint.
pub fn should_advance(
    waypoints: &[Point2<f64>],
    index: usize,
    position: &Point2<f64>,
    dist_to_target: f64,
    pass_distance: f64,
) -> bool {
    let Some(next) = waypoints.get(index + 1) else {
        return false;
    };
    if dist_to_target < pass_distance {
        return true;
    }
    (next - position).norm() < dist_to_target
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    const MIN_NORM: f64 = 1e-6;
    const PARALLEL: f64 = 1e-3;

    fn square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 100.0),
            Point2::new(0.0, 100.0),
        ]
    }

    #[test]
    fn first_segment_starts_at_origin() {
        let points = square();
        assert_eq!(path_direction(&points, 0), Vector2::new(100.0, 0.0));
        assert_eq!(path_direction(&points, 1), Vector2::new(0.0, 100.0));
        assert_eq!(path_direction(&points, 2), Vector2::new(-100.0, 0.0));
    }

    #[test]
    fn remaining_length_sums_later_segments() {
        let points = square();
        assert!((remaining_length(&points, 0) - 200.0).abs() < 1e-12);
        assert!((remaining_length(&points, 1) - 100.0).abs() < 1e-12);
        assert_eq!(remaining_length(&points, 2), 0.0);
    }

    #[rstest]
    #[case(Pose::new(50.0, 10.0, 0.0), -10.0)]
    #[case(Pose::new(50.0, -10.0, 0.0), 10.0)]
    #[case(Pose::new(50.0, 0.0, 1.0), 0.0)]
    fn cross_track_error_is_signed(#[case] pose: Pose, #[case] expected: f64) {
        let geometry = SegmentGeometry::measure(&square(), 0, &pose);
        let de = geometry.cross_track_error(MIN_NORM).unwrap();
        assert!((de - expected).abs() < 1e-9, "de = {}", de);
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(-FRAC_PI_2, FRAC_PI_2)]
    #[case(FRAC_PI_4, -FRAC_PI_4)]
    #[case(PI, FRAC_PI_2)]
    fn heading_deviation_points_toward_segment(#[case] theta: f64, #[case] expected: f64) {
        let geometry = SegmentGeometry::measure(&square(), 0, &Pose::new(0.0, 0.0, theta));
        let theta_t = geometry.heading_deviation(MIN_NORM, PARALLEL).unwrap();
        assert!((theta_t - expected).abs() < 1e-9, "theta_t = {}", theta_t);
    }

    #[test]
    fn degenerate_segment_has_no_direction() {
        let points = vec![Point2::new(0.0, 0.0)];
        let geometry = SegmentGeometry::measure(&points, 0, &Pose::new(5.0, 5.0, 0.3));
        assert!(geometry.cross_track_error(MIN_NORM).is_none());
        assert!(geometry.heading_deviation(MIN_NORM, PARALLEL).is_none());
    }

    #[test]
    fn target_cosine_detects_target_behind() {
        let points = square();
        let ahead = SegmentGeometry::measure(&points, 0, &Pose::new(50.0, 0.0, 0.0));
        let behind = SegmentGeometry::measure(&points, 0, &Pose::new(150.0, 0.0, 0.0));
        let on_top = SegmentGeometry::measure(&points, 0, &Pose::new(100.0, 0.0, 0.0));
        assert!((ahead.target_cosine().unwrap() - 1.0).abs() < 1e-12);
        assert!((behind.target_cosine().unwrap() + 1.0).abs() < 1e-12);
        assert!(on_top.target_cosine().is_none());
    }

    #[test]
    fn advances_inside_pass_radius() {
        let points = square();
        let position = Point2::new(60.0, 0.0);
        assert!(should_advance(&points, 0, &position, 40.0, 50.0));
        assert!(!should_advance(&points, 0, &Point2::new(20.0, 0.0), 80.0, 50.0));
    }

    #[test]
    fn advances_when_next_waypoint_is_closer() {
        let points = square();
        let position = Point2::new(180.0, 60.0);
        let dist = (points[0] - position).norm();
        assert!(dist > 50.0);
        assert!(should_advance(&points, 0, &position, dist, 50.0));
    }

    #[test]
    fn never_advances_past_last_waypoint() {
        let points = square();
        assert!(!should_advance(&points, 2, &Point2::new(0.0, 100.0), 0.0, 50.0));
    }
}
