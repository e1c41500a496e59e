//! # Robot Executable Parameters
//!
//! This module provides parameters for the robot executable, loaded from `bot_exec.toml`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use hal_if::{MotorConfig, NeutralMode, PidGains};
use serde::Deserialize;
use thiserror::Error;

use crate::units::Geometry;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct BotExecParams {
    /// Target period of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Length of the autonomous period of a match.
    ///
    /// Units: seconds
    pub auto_duration_s: f64,

    /// Length of the teleoperated period of a match.
    ///
    /// Units: seconds
    pub teleop_duration_s: f64,

    pub hardware: HardwareParams,

    pub geometry: Geometry,

    pub sim: SimParams,
}

/// Motor controller and gamepad configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HardwareParams {
    /// Driver station port of the gamepad
    pub gamepad_port: u8,

    pub left: SideParams,

    pub right: SideParams,

    pub neutral_mode: NeutralMode,

    pub peak_output_fwd: f64,

    pub peak_output_rev: f64,

    /// Closed loop slot used for velocity control
    pub pid_slot: u8,

    pub gains: PidGains,

    /// Units: milliseconds
    pub config_timeout_ms: u32,
}

/// Configuration specific to one side of the drivetrain.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SideParams {
    pub can_id: u8,

    /// Set so that a positive demand drives the robot forward.
    pub inverted: bool,

    /// Set so that the encoder counts up for a positive demand.
    pub sensor_phase: bool,
}

/// Properties of the simulated hardware.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SimParams {
    /// Units: ticks/100ms
    pub free_speed_ticks_per_100ms: f64,

    pub left_sensor_reversed: bool,

    pub right_sensor_reversed: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("Cycle period must be positive, found {0}")]
    InvalidCyclePeriod(f64),

    #[error("Match period durations must not be negative")]
    InvalidMatchDurations,

    #[error("Left and right controllers share CAN ID {0}")]
    DuplicateCanId(u8),

    #[error("Invalid motor configuration: {0}")]
    InvalidMotorConfig(hal_if::HalError),

    #[error("Wheel diameter and encoder resolution must be positive")]
    InvalidGeometry,

    #[error("Simulated free speed must be positive")]
    InvalidFreeSpeed,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl BotExecParams {
    /// Determines if the parameters are valid.
    pub fn are_valid(&self) -> Result<(), ParamsError> {
        if !(self.cycle_period_s > 0.0) {
            return Err(ParamsError::InvalidCyclePeriod(self.cycle_period_s));
        }

        if self.auto_duration_s < 0.0 || self.teleop_duration_s < 0.0 {
            return Err(ParamsError::InvalidMatchDurations);
        }

        if !self.geometry.is_valid() {
            return Err(ParamsError::InvalidGeometry);
        }

        if !(self.sim.free_speed_ticks_per_100ms > 0.0) {
            return Err(ParamsError::InvalidFreeSpeed);
        }

        self.hardware.are_valid()
    }
}

impl HardwareParams {
    /// Determines if the parameters are valid.
    pub fn are_valid(&self) -> Result<(), ParamsError> {
        if self.left.can_id == self.right.can_id {
            return Err(ParamsError::DuplicateCanId(self.left.can_id));
        }

        self.motor_config(&self.left)
            .is_valid()
            .map_err(ParamsError::InvalidMotorConfig)
    }

    /// Build the controller configuration for one side of the drivetrain.
    pub fn motor_config(&self, side: &SideParams) -> MotorConfig {
        MotorConfig {
            inverted: side.inverted,
            sensor_phase: side.sensor_phase,
            neutral_mode: self.neutral_mode,
            peak_output_fwd: self.peak_output_fwd,
            peak_output_rev: self.peak_output_rev,
            pid_slot: self.pid_slot,
            gains: self.gains,
            timeout_ms: self.config_timeout_ms,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PARAMS: &str = include_str!("../../params/bot_exec.toml");

    #[test]
    fn test_shipped_params() {
        let params: BotExecParams = toml::from_str(PARAMS).unwrap();
        params.are_valid().unwrap();

        assert_eq!(params.cycle_period_s, 0.02);
        assert_eq!(params.hardware.left.can_id, 10);
        assert_eq!(params.hardware.right.can_id, 20);
        assert!(params.hardware.left.inverted);
        assert!(!params.hardware.right.inverted);
        assert_eq!(params.hardware.neutral_mode, NeutralMode::Brake);
        assert_eq!(params.hardware.gains.kp, 0.1);
        assert!((params.hardware.gains.kf - 1023.0 / 1460.0).abs() < 1e-12);
        assert_eq!(params.hardware.config_timeout_ms, 30);
        assert_eq!(params.geometry, Geometry::default());
    }

    #[test]
    fn test_duplicate_can_id() {
        let mut params: BotExecParams = toml::from_str(PARAMS).unwrap();
        params.hardware.right.can_id = params.hardware.left.can_id;

        assert!(matches!(
            params.are_valid(),
            Err(ParamsError::DuplicateCanId(10))
        ));
    }

    #[test]
    fn test_invalid_peak_output() {
        let mut params: BotExecParams = toml::from_str(PARAMS).unwrap();
        params.hardware.peak_output_rev = 0.5;

        assert!(matches!(
            params.are_valid(),
            Err(ParamsError::InvalidMotorConfig(_))
        ));
    }
}
