// src/hardware/sim.rs
// Simulated Zumo drivetrain: each wheel follows its motor command through a
// first-order lag, and travel is quantized into whole encoder pulses.

use std::time::Duration;

use log::debug;

use super::{EncoderDeltas, EncoderSource, MotorDriver};
use crate::config::{RobotGeometry, SimulationConfig};
use crate::error::{Result, ZumoError};
use crate::navigation::MotorCommand;

/// Simulated differential-drive robot
#[derive(Debug, Clone)]
pub struct SimulatedZumo {
    config: SimulationConfig,
    mm_per_pulse: f64,
    saturation: i32,
    command: MotorCommand,
    wheel_speed: [f64; 2],     // left, right (mm/s)
    pending_travel: [f64; 2],  // travel not yet counted as a pulse (mm)
    pulses: [i32; 2],          // pulses since the last read
}

impl SimulatedZumo {
    /// Creates a stationary robot
    pub fn new(geometry: &RobotGeometry, config: &SimulationConfig, saturation: i32) -> Self {
        SimulatedZumo {
            config: config.clone(),
            mm_per_pulse: geometry.mm_per_pulse(),
            saturation,
            command: MotorCommand::STOP,
            wheel_speed: [0.0; 2],
            pending_travel: [0.0; 2],
            pulses: [0; 2],
        }
    }

    /// Advances the plant by `elapsed` under the last applied command
    pub fn step(&mut self, elapsed: Duration) {
        let dt = elapsed.as_secs_f64();
        let alpha = (dt / self.config.time_constant).min(1.0);
        let commands = [self.command.left, self.command.right];

        for wheel in 0..2 {
            let steady = f64::from(commands[wheel]) * self.config.speed_per_command;
            self.wheel_speed[wheel] += alpha * (steady - self.wheel_speed[wheel]);

            self.pending_travel[wheel] += self.wheel_speed[wheel] * dt;
            let whole = (self.pending_travel[wheel] / self.mm_per_pulse).trunc();
            self.pending_travel[wheel] -= whole * self.mm_per_pulse;
            self.pulses[wheel] += whole as i32;
        }
    }

    /// Current wheel speeds (mm/s)
    pub fn wheel_speeds(&self) -> (f64, f64) {
        (self.wheel_speed[0], self.wheel_speed[1])
    }

    /// Last applied command
    pub fn command(&self) -> MotorCommand {
        self.command
    }
}

impl EncoderSource for SimulatedZumo {
    fn read_deltas(&mut self) -> Result<EncoderDeltas> {
        let deltas = EncoderDeltas {
            left: self.pulses[0],
            right: self.pulses[1],
        };
        self.pulses = [0; 2];
        Ok(deltas)
    }
}

impl MotorDriver for SimulatedZumo {
    fn set_speeds(&mut self, command: MotorCommand) -> Result<()> {
        if command.left.abs() > self.saturation || command.right.abs() > self.saturation {
            return Err(ZumoError::Hardware(format!(
                "command ({}, {}) exceeds motor limit {}",
                command.left, command.right, self.saturation
            )));
        }
        if command != self.command {
            debug!("Simulated motors: ({}, {})", command.left, command.right);
        }
        self.command = command;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(10);

    fn zumo() -> SimulatedZumo {
        SimulatedZumo::new(&RobotGeometry::default(), &SimulationConfig::default(), 400)
    }

    #[test]
    fn idle_robot_reports_no_pulses() {
        let mut sim = zumo();
        for _ in 0..10 {
            sim.step(TICK);
        }
        assert_eq!(sim.read_deltas().unwrap(), EncoderDeltas::default());
    }

    #[test]
    fn wheel_speed_settles_at_command_gain() {
        let mut sim = zumo();
        sim.set_speeds(MotorCommand { left: 100, right: -100 }).unwrap();
        for _ in 0..200 {
            sim.step(TICK);
        }
        let (left, right) = sim.wheel_speeds();
        assert!((left - 150.0).abs() < 1e-3);
        assert!((right + 150.0).abs() < 1e-3);
    }

    #[test]
    fn pulses_accumulate_until_read() {
        let mut sim = zumo();
        sim.set_speeds(MotorCommand { left: 200, right: 200 }).unwrap();
        for _ in 0..50 {
            sim.step(TICK);
        }
        let first = sim.read_deltas().unwrap();
        assert!(first.left > 0);
        assert_eq!(first.left, first.right);
        assert_eq!(sim.read_deltas().unwrap(), EncoderDeltas::default());
    }

    #[test]
    fn rejects_unsaturated_commands() {
        let mut sim = zumo();
        let result = sim.set_speeds(MotorCommand { left: 401, right: 0 });
        assert!(matches!(result, Err(ZumoError::Hardware(_))));
        assert_eq!(sim.command(), MotorCommand::STOP);
    }
}
