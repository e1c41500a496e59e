//! # Motor Controller Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Unified API for a smart motor controller with an attached quadrature encoder.
///
/// Sensor units are raw encoder ticks for position and ticks per 100 ms for velocity, matching
/// what the controllers report on the bus.
pub trait MotorController {
    /// The CAN ID of the controller.
    fn can_id(&self) -> u8;

    /// Return all settings on the controller to their factory defaults.
    fn config_factory_default(&mut self) -> Result<(), HalError>;

    /// Apply the given configuration to the controller.
    fn configure(&mut self, config: &MotorConfig) -> Result<(), HalError>;

    /// Command the controller.
    fn set(&mut self, demand: MotorDemand) -> Result<(), HalError>;

    /// Position of the selected sensor in ticks.
    fn selected_sensor_position(&self) -> Result<f64, HalError>;

    /// Velocity of the selected sensor in ticks per 100 ms.
    fn selected_sensor_velocity(&self) -> Result<f64, HalError>;

    /// Overwrite the position of the selected sensor, normally used to zero it.
    fn set_selected_sensor_position(&mut self, ticks: f64) -> Result<(), HalError>;

    /// Currently active faults.
    fn faults(&self) -> Result<Faults, HalError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A demand for a motor controller.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MotorDemand {
    /// How `value` is interpreted by the controller
    pub mode: ControlMode,

    /// Fraction of the maximum output for `PercentOutput`, or ticks per 100 ms for `Velocity`.
    pub value: f64,
}

/// Closed loop gains for a single PID slot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct PidGains {
    pub kf: f64,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

/// Configuration applied to a controller at start up.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MotorConfig {
    /// Invert the output so that positive demands drive the robot forward.
    pub inverted: bool,

    /// Flip the sensor so that it counts up when the output is positive.
    pub sensor_phase: bool,

    pub neutral_mode: NeutralMode,

    /// Maximum forward output, between 0 and +1.
    pub peak_output_fwd: f64,

    /// Maximum reverse output, between -1 and 0.
    pub peak_output_rev: f64,

    /// Slot the gains are written into.
    pub pid_slot: u8,

    pub gains: PidGains,

    /// Time to wait for the controller to acknowledge each config frame.
    pub timeout_ms: u32,
}

/// Fault flags reported by a controller.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Faults {
    /// The sensor is moving in the opposite direction to the output.
    pub sensor_out_of_phase: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The ways in which a controller can be commanded.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    /// Output as a fraction of the maximum voltage.
    PercentOutput,

    /// Target encoder rate tracked by the controller's onboard PID.
    Velocity,

    /// Neutral output, the motor brakes or coasts depending on its neutral mode.
    Disabled,
}

/// Behaviour of the motor when the output is neutral.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeutralMode {
    Brake,
    Coast,
}

/// Errors raised by the hardware interface.
#[derive(Debug, Error)]
pub enum HalError {
    #[error("Demand value must be finite, found {0}")]
    InvalidDemand(f64),

    #[error("Invalid controller configuration: {0}")]
    InvalidConfig(String),

    #[error("No device found with CAN ID {0}")]
    DeviceNotFound(u8),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MotorDemand {
    pub fn percent(value: f64) -> Self {
        Self {
            mode: ControlMode::PercentOutput,
            value,
        }
    }

    pub fn velocity(ticks_per_100ms: f64) -> Self {
        Self {
            mode: ControlMode::Velocity,
            value: ticks_per_100ms,
        }
    }

    pub fn neutral() -> Self {
        Self {
            mode: ControlMode::Disabled,
            value: 0.0,
        }
    }
}

impl Default for MotorDemand {
    fn default() -> Self {
        Self::neutral()
    }
}

impl Default for MotorConfig {
    /// Factory default configuration.
    fn default() -> Self {
        Self {
            inverted: false,
            sensor_phase: false,
            neutral_mode: NeutralMode::Coast,
            peak_output_fwd: 1.0,
            peak_output_rev: -1.0,
            pid_slot: 0,
            gains: PidGains::default(),
            timeout_ms: 0,
        }
    }
}

impl MotorConfig {
    /// Determines if the configuration can be applied to a controller.
    pub fn is_valid(&self) -> Result<(), HalError> {
        if !(0.0..=1.0).contains(&self.peak_output_fwd) {
            return Err(HalError::InvalidConfig(format!(
                "peak forward output must be between 0 and 1, found {}",
                self.peak_output_fwd
            )));
        }

        if !(-1.0..=0.0).contains(&self.peak_output_rev) {
            return Err(HalError::InvalidConfig(format!(
                "peak reverse output must be between -1 and 0, found {}",
                self.peak_output_rev
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(MotorConfig::default().is_valid().is_ok());

        let mut cfg = MotorConfig::default();
        cfg.peak_output_fwd = 1.5;
        assert!(cfg.is_valid().is_err());

        let mut cfg = MotorConfig::default();
        cfg.peak_output_rev = 0.2;
        assert!(cfg.is_valid().is_err());
    }
}
