//! Hardware capability interfaces for Zumo Pilot
//!
//! The controller never touches encoders or motor drivers directly. It is handed
//! something that can report per-tick encoder deltas and something that accepts a
//! motor command pair. [`SimulatedZumo`] provides both without a robot attached.

pub mod sim;

pub use sim::SimulatedZumo;

use crate::error::Result;
use crate::navigation::MotorCommand;

/// Encoder counts accumulated since the previous read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncoderDeltas {
    /// Left wheel pulses
    pub left: i32,
    /// Right wheel pulses
    pub right: i32,
}

/// Reads and clears the wheel encoder counters
#[cfg_attr(test, mockall::automock)]
pub trait EncoderSource {
    /// Pulses counted on each wheel since the last call
    fn read_deltas(&mut self) -> Result<EncoderDeltas>;
}

/// Accepts saturated motor commands
#[cfg_attr(test, mockall::automock)]
pub trait MotorDriver {
    /// Applies a command pair to the motors
    fn set_speeds(&mut self, command: MotorCommand) -> Result<()>;
}
