// src/navigation/controller.rs
// Closes the per-wheel speed loop: PI control on the wheel velocity error and
// symmetric saturation of the resulting integer motor commands.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::config::WheelControllerConfig;
use crate::core::{MotorState, WheelKinematics};

/// Saturated motor command pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorCommand {
    /// Left motor command
    pub left: i32,
    /// Right motor command
    pub right: i32,
}

/// Target wheel velocities from the steering mix (mm/s)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelTargets {
    /// Left wheel target
    pub v_left: f64,
    /// Right wheel target
    pub v_right: f64,
}

/// Integral accumulators carried between ticks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PidState {
    /// Summed left wheel error
    pub err_sum_left: f64,
    /// Summed right wheel error
    pub err_sum_right: f64,
}

impl MotorCommand {
    /// Both motors off
    pub const STOP: MotorCommand = MotorCommand { left: 0, right: 0 };

    /// Idle/moving flag for this command
    pub fn motor_state(&self) -> MotorState {
        MotorState::from_speeds(self.left, self.right)
    }
}

impl WheelTargets {
    /// Differential steering mix around a forward speed
    pub fn mix(v_forward: f64, steering: f64) -> Self {
        WheelTargets {
            v_left: v_forward - steering,
            v_right: v_forward + steering,
        }
    }
}

/// Per-wheel PI speed controller
#[derive(Debug, Clone)]
pub struct WheelSpeedController {
    config: WheelControllerConfig,
}

impl WheelSpeedController {
    /// Creates a controller from its gains and saturation bound
    pub fn new(config: &WheelControllerConfig) -> Self {
        WheelSpeedController {
            config: config.clone(),
        }
    }

    /// Runs one PI step and returns the saturated command.
    ///
    /// The integral is the raw sum of per-tick errors. It only stays bounded when
    /// `integral_limit` is configured.
    pub fn compute(
        &self,
        pid: &mut PidState,
        targets: WheelTargets,
        measured: WheelKinematics,
    ) -> MotorCommand {
        let error_left = targets.v_left - measured.v_left;
        let error_right = targets.v_right - measured.v_right;

        pid.err_sum_left += error_left;
        pid.err_sum_right += error_right;
        if let Some(limit) = self.config.integral_limit {
            pid.err_sum_left = pid.err_sum_left.clamp(-limit, limit);
            pid.err_sum_right = pid.err_sum_right.clamp(-limit, limit);
        }

        let u_left = self.config.kp * error_left + self.config.ki * pid.err_sum_left;
        let u_right = self.config.kp * error_right + self.config.ki * pid.err_sum_right;

        trace!(
            "Wheel loop: err=({:.2}, {:.2}) sum=({:.2}, {:.2}) u=({:.2}, {:.2})",
            error_left, error_right, pid.err_sum_left, pid.err_sum_right, u_left, u_right
        );

        self.saturate(u_left, u_right)
    }

    /// Truncates each output toward zero and clamps it to the bound
    pub fn saturate(&self, u_left: f64, u_right: f64) -> MotorCommand {
        let bound = self.config.saturation;
        MotorCommand {
            left: (u_left as i32).clamp(-bound, bound),
            right: (u_right as i32).clamp(-bound, bound),
        }
    }

    /// Symmetric command bound
    pub fn saturation(&self) -> i32 {
        self.config.saturation
    }
}
