//! Simulated motor controller with an attached encoder

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;

use super::Simulated;
use crate::motor::{
    ControlMode, Faults, HalError, MotorConfig, MotorController, MotorDemand, NeutralMode,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Sensor velocity at full output.
///
/// Units: ticks/100ms
pub const DEFAULT_FREE_SPEED_TICKS_PER_100MS: f64 = 1460.0;

/// Time constant of the velocity response while the motor is driven.
const DRIVEN_TIME_CONSTANT_S: f64 = 0.1;

/// Time constant of the velocity decay in brake mode.
const BRAKE_TIME_CONSTANT_S: f64 = 0.02;

/// Time constant of the velocity decay in coast mode.
const COAST_TIME_CONSTANT_S: f64 = 0.5;

/// Minimum output at which a sensor phase fault can be detected.
const PHASE_CHECK_MIN_OUTPUT: f64 = 0.25;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Simulated smart motor controller.
#[derive(Debug, Clone)]
pub struct SimMotorController {
    can_id: u8,

    config: MotorConfig,

    demand: MotorDemand,

    /// True if the encoder is wired so that it counts down for a positive output.
    sensor_reversed: bool,

    free_speed: f64,

    /// False simulates a controller missing from the bus.
    present: bool,

    /// Output after peak limiting, before inversion.
    output: f64,

    sensor_vel: f64,

    sensor_pos: f64,

    faults: Faults,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimMotorController {
    pub fn new(can_id: u8) -> Self {
        Self {
            can_id,
            config: MotorConfig::default(),
            demand: MotorDemand::neutral(),
            sensor_reversed: false,
            free_speed: DEFAULT_FREE_SPEED_TICKS_PER_100MS,
            present: true,
            output: 0.0,
            sensor_vel: 0.0,
            sensor_pos: 0.0,
            faults: Faults::default(),
        }
    }

    /// Wire the encoder backwards, so that it needs the sensor phase flag set.
    pub fn with_sensor_reversed(mut self, reversed: bool) -> Self {
        self.sensor_reversed = reversed;
        self
    }

    pub fn with_free_speed(mut self, ticks_per_100ms: f64) -> Self {
        self.free_speed = ticks_per_100ms;
        self
    }

    /// Connect or disconnect the controller from the simulated bus.
    pub fn set_present(&mut self, present: bool) {
        self.present = present;
    }

    pub fn config(&self) -> &MotorConfig {
        &self.config
    }

    pub fn demand(&self) -> MotorDemand {
        self.demand
    }

    /// Output applied to the motor terminals, including inversion.
    pub fn motor_output_percent(&self) -> f64 {
        if self.config.inverted {
            -self.output
        } else {
            self.output
        }
    }

    fn check_present(&self) -> Result<(), HalError> {
        match self.present {
            true => Ok(()),
            false => Err(HalError::DeviceNotFound(self.can_id)),
        }
    }

    fn sensor_sign(&self) -> f64 {
        if self.sensor_reversed != self.config.sensor_phase {
            -1.0
        } else {
            1.0
        }
    }

    fn limit(&self, output: f64) -> f64 {
        output.clamp(self.config.peak_output_rev, self.config.peak_output_fwd)
    }

    /// Output the controller applies to meet the current demand.
    fn calc_output(&self) -> f64 {
        match self.demand.mode {
            ControlMode::PercentOutput => self.limit(self.demand.value),
            ControlMode::Velocity => {
                if self.sensor_sign() > 0.0 {
                    self.limit(self.demand.value / self.free_speed)
                } else if self.demand.value > 0.0 {
                    // Feedback has the wrong sign so the loop runs away
                    self.config.peak_output_fwd
                } else if self.demand.value < 0.0 {
                    self.config.peak_output_rev
                } else {
                    0.0
                }
            }
            ControlMode::Disabled => 0.0,
        }
    }
}

impl MotorController for SimMotorController {
    fn can_id(&self) -> u8 {
        self.can_id
    }

    fn config_factory_default(&mut self) -> Result<(), HalError> {
        self.check_present()?;
        self.config = MotorConfig::default();
        Ok(())
    }

    fn configure(&mut self, config: &MotorConfig) -> Result<(), HalError> {
        self.check_present()?;
        config.is_valid()?;
        self.config = *config;
        Ok(())
    }

    fn set(&mut self, demand: MotorDemand) -> Result<(), HalError> {
        self.check_present()?;
        if !demand.value.is_finite() {
            return Err(HalError::InvalidDemand(demand.value));
        }
        self.demand = demand;
        Ok(())
    }

    fn selected_sensor_position(&self) -> Result<f64, HalError> {
        self.check_present()?;
        Ok(self.sensor_pos)
    }

    fn selected_sensor_velocity(&self) -> Result<f64, HalError> {
        self.check_present()?;
        Ok(self.sensor_vel)
    }

    fn set_selected_sensor_position(&mut self, ticks: f64) -> Result<(), HalError> {
        self.check_present()?;
        self.sensor_pos = ticks;
        Ok(())
    }

    fn faults(&self) -> Result<Faults, HalError> {
        self.check_present()?;
        Ok(self.faults)
    }
}

impl Simulated for SimMotorController {
    fn step(&mut self, dt_s: f64) {
        if !self.present || dt_s <= 0.0 {
            return;
        }

        self.output = self.calc_output();

        let target_vel = self.output * self.free_speed * self.sensor_sign();

        let time_constant = if self.output != 0.0 {
            DRIVEN_TIME_CONSTANT_S
        } else {
            match self.config.neutral_mode {
                NeutralMode::Brake => BRAKE_TIME_CONSTANT_S,
                NeutralMode::Coast => COAST_TIME_CONSTANT_S,
            }
        };

        let alpha = (dt_s / time_constant).min(1.0);
        self.sensor_vel += (target_vel - self.sensor_vel) * alpha;

        // Velocity is per 100 ms
        self.sensor_pos += self.sensor_vel * dt_s * 10.0;

        self.faults.sensor_out_of_phase =
            self.output.abs() >= PHASE_CHECK_MIN_OUTPUT && self.sensor_vel * self.output < 0.0;

        trace!(
            "Sim motor {}: out {:.3}, vel {:.1}, pos {:.1}",
            self.can_id,
            self.output,
            self.sensor_vel,
            self.sensor_pos
        );
    }
}
