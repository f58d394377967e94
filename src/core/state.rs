// core/state.rs

// Discrete controller states: the motor idle/moving flag and the waypoint-tracking
// phase. Tracking(i) only moves forward; Stopped is terminal until a reset.

use serde::{Deserialize, Serialize};

/// Whether the last emitted motor command drives the wheels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotorState {
    /// Both saturated commands are zero
    #[default]
    Idle,
    /// At least one wheel is commanded
    Moving,
}

/// Path tracker phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingPhase {
    /// Pursuing the waypoint at this index
    Tracking(usize),
    /// Final waypoint reached; only zero commands are issued
    Stopped,
}

impl MotorState {
    /// Derives the flag from a saturated command pair
    pub fn from_speeds(left: i32, right: i32) -> Self {
        if left == 0 && right == 0 {
            MotorState::Idle
        } else {
            MotorState::Moving
        }
    }
}

impl Default for TrackingPhase {
    fn default() -> Self {
        TrackingPhase::Tracking(0)
    }
}
