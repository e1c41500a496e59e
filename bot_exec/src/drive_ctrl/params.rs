//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use hal_if::gamepad::{NUM_AXES, NUM_BUTTONS};
use serde::Deserialize;
use thiserror::Error;

use super::DriveMode;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for drive control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- INPUTS ----

    /// Axis driving the left side of the robot
    pub left_axis: usize,

    /// Axis driving the right side of the robot
    pub right_axis: usize,

    /// Negate the axes, gamepads report forward stick as negative.
    pub invert_axes: bool,

    /// Stick values with a magnitude below this are treated as zero.
    pub deadband: f64,

    // ---- OUTPUTS ----

    /// Gain applied to the sticks in percent mode, limiting the output
    /// voltage.
    pub max_percent: f64,

    /// Speed demanded at full stick in velocity mode.
    ///
    /// Units: inches/second
    pub max_velocity_ips: f64,

    /// Send percent demands through the tank drive helper rather than
    /// directly.
    pub use_tank_drive: bool,

    /// Square stick inputs in the tank drive helper.
    pub square_inputs: bool,

    // ---- MODES ----

    /// Mode to start teleop in
    pub initial_mode: DriveMode,

    /// Whether the driver can change mode with the buttons below.
    pub allow_mode_switch: bool,

    /// Button selecting percent mode
    pub percent_button: usize,

    /// Button selecting velocity mode
    pub velocity_button: usize,

    /// While any of these buttons is held telemetry is logged every cycle
    pub log_buttons: Vec<usize>,
}

/// Errors in the drive control parameters.
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("Axis {0} does not exist on the gamepad")]
    InvalidAxis(usize),

    #[error("Button {0} does not exist on the gamepad")]
    InvalidButton(usize),

    #[error("The deadband must be between 0 and 1, found {0}")]
    InvalidDeadband(f64),

    #[error("The percent gain must be between 0 and 1, found {0}")]
    InvalidMaxPercent(f64),

    #[error("The maximum velocity must be positive, found {0}")]
    InvalidMaxVelocity(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {

    /// Determines if the parameters are valid.
    pub fn are_valid(&self) -> Result<(), ParamsError> {
        for &axis in [self.left_axis, self.right_axis].iter() {
            if axis >= NUM_AXES {
                return Err(ParamsError::InvalidAxis(axis));
            }
        }

        let buttons = [self.percent_button, self.velocity_button];
        for &button in buttons.iter().chain(self.log_buttons.iter()) {
            if button == 0 || button > NUM_BUTTONS {
                return Err(ParamsError::InvalidButton(button));
            }
        }

        if !(0.0..1.0).contains(&self.deadband) {
            return Err(ParamsError::InvalidDeadband(self.deadband));
        }

        if !(self.max_percent > 0.0 && self.max_percent <= 1.0) {
            return Err(ParamsError::InvalidMaxPercent(self.max_percent));
        }

        if !(self.max_velocity_ips > 0.0) {
            return Err(ParamsError::InvalidMaxVelocity(self.max_velocity_ips));
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            left_axis: hal_if::gamepad::axis::LEFT_Y,
            right_axis: hal_if::gamepad::axis::RIGHT_Y,
            invert_axes: true,
            deadband: 0.10,
            max_percent: 0.45,
            max_velocity_ips: 150.0,
            use_tank_drive: false,
            square_inputs: false,
            initial_mode: DriveMode::Percent,
            allow_mode_switch: true,
            percent_button: hal_if::gamepad::button::A,
            velocity_button: hal_if::gamepad::button::B,
            log_buttons: vec![
                hal_if::gamepad::button::LEFT_BUMPER,
                hal_if::gamepad::button::RIGHT_BUMPER,
            ],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shipped_variants() {
        let switchable: Params =
            toml::from_str(include_str!("../../../params/drive_ctrl.toml")).unwrap();
        let percent: Params =
            toml::from_str(include_str!("../../../params/drive_ctrl_percent.toml")).unwrap();
        let velocity: Params =
            toml::from_str(include_str!("../../../params/drive_ctrl_velocity.toml")).unwrap();

        for p in [&switchable, &percent, &velocity].iter() {
            p.are_valid().unwrap();
            assert_eq!(p.deadband, 0.10);
            assert_eq!(p.max_percent, 0.45);
            assert_eq!(p.max_velocity_ips, 150.0);
        }

        assert!(switchable.allow_mode_switch);
        assert_eq!(switchable.initial_mode, DriveMode::Percent);
        assert!(!switchable.use_tank_drive);

        assert!(!percent.allow_mode_switch);
        assert!(percent.use_tank_drive);

        assert!(!velocity.allow_mode_switch);
        assert_eq!(velocity.initial_mode, DriveMode::Velocity);
    }

    #[test]
    fn test_invalid_params() {
        let mut p = Params::default();
        p.right_axis = 6;
        assert!(matches!(p.are_valid(), Err(ParamsError::InvalidAxis(6))));

        let mut p = Params::default();
        p.log_buttons.push(0);
        assert!(matches!(p.are_valid(), Err(ParamsError::InvalidButton(0))));

        let mut p = Params::default();
        p.deadband = 1.0;
        assert!(matches!(p.are_valid(), Err(ParamsError::InvalidDeadband(_))));

        let mut p = Params::default();
        p.max_percent = 0.0;
        assert!(matches!(p.are_valid(), Err(ParamsError::InvalidMaxPercent(_))));
    }
}
