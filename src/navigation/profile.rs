// src/navigation/profile.rs
// Forward-speed profile: square-root deceleration toward the goal, rate-limited
// against the previously commanded speed and capped at the maximum speed.

/// Acceleration-limited forward speed profile
#[derive(Debug, Clone, Copy)]
pub struct VelocityProfile {
    max_acceleration: f64,
    max_speed: f64,
}

impl VelocityProfile {
    /// Creates a profile from the acceleration (mm/s^2) and speed (mm/s) limits
    pub fn new(max_acceleration: f64, max_speed: f64) -> Self {
        VelocityProfile {
            max_acceleration,
            max_speed,
        }
    }

    /// Speed that decelerates to rest over `remaining` millimetres.
    ///
    /// Half the kinematic limit `sqrt(2 a d)`, so braking starts early and stays gentle.
    pub fn candidate(&self, remaining: f64) -> f64 {
        (2.0 * self.max_acceleration * remaining.max(0.0)).sqrt() / 2.0
    }

    /// Next commanded speed.
    ///
    /// Moves from `previous` toward the candidate by at most `a_max * dt` in either
    /// direction, then clamps to the speed limit.
    pub fn shape(&self, remaining: f64, previous: f64, dt: f64) -> f64 {
        let max_change = self.max_acceleration * dt.max(0.0);
        let limited = self
            .candidate(remaining)
            .clamp(previous - max_change, previous + max_change);
        limited.clamp(-self.max_speed, self.max_speed)
    }

    /// Speed limit (mm/s)
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }
}
