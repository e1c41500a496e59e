//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use hal_if::GamepadFrame;
use log::{info, trace};
use serde::Serialize;

// Internal
use super::{apply_deadband, DriveCtrlError, DriveMode, Params, ParamsError};
use crate::drivetrain::{DriveDemands, OutputKind, SideDemand};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state
#[derive(Default)]
pub struct DriveCtrl {
    params: Params,

    mode: DriveMode,

    initialised: bool,
}

/// Status report for DriveCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Mode used for this cycle's demands
    pub mode: DriveMode,

    /// True if the driver changed mode on this cycle
    pub mode_changed: bool,

    /// Left command after the deadband, and after the gain in percent mode
    pub left_fwd: f64,

    /// Right command after the deadband, and after the gain in percent mode
    pub right_fwd: f64,

    /// True if the driver is holding a log button
    pub log_requested: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for DriveMode {
    fn default() -> Self {
        DriveMode::Percent
    }
}

impl State for DriveCtrl {
    type InitData = Params;
    type InitError = ParamsError;

    type InputData = GamepadFrame;
    type OutputData = DriveDemands;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    /// Initialise the DriveCtrl module.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        init_data.are_valid()?;

        self.mode = init_data.initial_mode;
        self.params = init_data;
        self.initialised = true;

        Ok(())
    }

    /// Perform cyclic processing of drive control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        if !self.initialised {
            return Err(DriveCtrlError::NotInitialised);
        }

        if !input_data.connected {
            return Err(DriveCtrlError::GamepadDisconnected);
        }

        let mut report = StatusReport::default();

        // Positive is forward
        let sign = if self.params.invert_axes { -1.0 } else { 1.0 };
        let left_fwd = apply_deadband(
            sign * input_data.axis(self.params.left_axis),
            self.params.deadband
        );
        let right_fwd = apply_deadband(
            sign * input_data.axis(self.params.right_axis),
            self.params.deadband
        );

        if self.params.allow_mode_switch {
            report.mode_changed = self.check_mode_buttons(input_data);
        }

        let (left, right) = match self.mode {
            DriveMode::Percent => {
                report.left_fwd = left_fwd * self.params.max_percent;
                report.right_fwd = right_fwd * self.params.max_percent;
                (
                    SideDemand::Percent(report.left_fwd),
                    SideDemand::Percent(report.right_fwd)
                )
            },
            DriveMode::Velocity => {
                report.left_fwd = left_fwd;
                report.right_fwd = right_fwd;
                (
                    SideDemand::VelocityIps(left_fwd * self.params.max_velocity_ips),
                    SideDemand::VelocityIps(right_fwd * self.params.max_velocity_ips)
                )
            }
        };

        let output = match self.params.use_tank_drive {
            true => OutputKind::TankDrive { square_inputs: self.params.square_inputs },
            false => OutputKind::Direct
        };

        report.mode = self.mode;
        report.log_requested = self.params.log_buttons
            .iter()
            .any(|&b| input_data.button(b));

        let demands = DriveDemands { left, right, output };

        trace!("DriveCtrl output: {:?}", demands);

        Ok((demands, report))
    }
}

impl DriveCtrl {

    /// The currently selected drive mode.
    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    /// Change mode based on the mode buttons. The velocity button wins if
    /// both are held.
    ///
    /// Returns true if the mode changed.
    fn check_mode_buttons(&mut self, input_data: &GamepadFrame) -> bool {
        let requested = if input_data.button(self.params.velocity_button) {
            Some(DriveMode::Velocity)
        }
        else if input_data.button(self.params.percent_button) {
            Some(DriveMode::Percent)
        }
        else {
            None
        };

        match requested {
            Some(m) if m != self.mode => {
                self.mode = m;
                match m {
                    DriveMode::Percent => info!("Switched to Percent Drive"),
                    DriveMode::Velocity => info!("Switched to Velocity Drive")
                }
                true
            },
            _ => false
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hal_if::gamepad::{axis, button};

    fn ctrl(params: Params) -> DriveCtrl {
        let mut dc = DriveCtrl::default();
        dc.init(params).unwrap();
        dc
    }

    fn frame(left_y: f64, right_y: f64, buttons: &[usize]) -> GamepadFrame {
        let mut f = GamepadFrame {
            connected: true,
            ..Default::default()
        };
        f.axes[axis::LEFT_Y] = left_y;
        f.axes[axis::RIGHT_Y] = right_y;
        for &b in buttons {
            f.buttons[b - 1] = true;
        }
        f
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_not_initialised() {
        let mut dc = DriveCtrl::default();
        assert!(matches!(
            dc.proc(&frame(0.0, 0.0, &[])),
            Err(DriveCtrlError::NotInitialised)
        ));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut dc = DriveCtrl::default();
        let mut p = Params::default();
        p.deadband = -0.1;

        assert!(dc.init(p).is_err());
    }

    #[test]
    fn test_percent_mode_gain_and_direction() {
        let mut dc = ctrl(Params::default());

        // Forward on the stick is negative
        let (dems, rpt) = dc.proc(&frame(-1.0, -0.5, &[])).unwrap();

        assert_eq!(dems.output, OutputKind::Direct);
        match (dems.left, dems.right) {
            (SideDemand::Percent(l), SideDemand::Percent(r)) => {
                assert!(approx(l, 0.45));
                assert!(approx(r, 0.225));
            },
            d => panic!("Expected percent demands, got {:?}", d)
        }
        assert_eq!(rpt.mode, DriveMode::Percent);
        assert!(approx(rpt.left_fwd, 0.45));
        assert!(!rpt.log_requested);
    }

    #[test]
    fn test_deadband() {
        let mut dc = ctrl(Params::default());

        let (dems, _) = dc.proc(&frame(-0.09, 0.099, &[])).unwrap();
        assert_eq!(dems.left, SideDemand::Percent(0.0));
        assert_eq!(dems.right, SideDemand::Percent(0.0));

        // Values outside the deadband are not rescaled
        let (dems, _) = dc.proc(&frame(-0.2, 0.0, &[])).unwrap();
        assert!(approx(dems.left.value(), 0.2 * 0.45));
    }

    #[test]
    fn test_mode_switching() {
        let mut dc = ctrl(Params::default());

        let (dems, rpt) = dc.proc(&frame(-0.5, 0.5, &[button::B])).unwrap();
        assert!(rpt.mode_changed);
        assert_eq!(rpt.mode, DriveMode::Velocity);
        assert!(approx(dems.left.value(), 75.0));
        assert!(approx(dems.right.value(), -75.0));
        assert!(matches!(dems.left, SideDemand::VelocityIps(_)));

        // Mode is kept once the button is released
        let (_, rpt) = dc.proc(&frame(0.0, 0.0, &[])).unwrap();
        assert!(!rpt.mode_changed);
        assert_eq!(rpt.mode, DriveMode::Velocity);

        // Holding the button doesn't report a change every cycle
        let (_, rpt) = dc.proc(&frame(0.0, 0.0, &[button::B])).unwrap();
        assert!(!rpt.mode_changed);

        let (dems, rpt) = dc.proc(&frame(-1.0, 0.0, &[button::A])).unwrap();
        assert!(rpt.mode_changed);
        assert_eq!(dems.left, SideDemand::Percent(0.45));
    }

    #[test]
    fn test_velocity_button_wins() {
        let mut dc = ctrl(Params::default());

        let (_, rpt) = dc.proc(&frame(0.0, 0.0, &[button::A, button::B])).unwrap();
        assert_eq!(rpt.mode, DriveMode::Velocity);
    }

    #[test]
    fn test_switching_disabled() {
        let mut p = Params::default();
        p.allow_mode_switch = false;
        p.initial_mode = DriveMode::Velocity;
        let mut dc = ctrl(p);

        let (_, rpt) = dc.proc(&frame(0.0, 0.0, &[button::A])).unwrap();
        assert!(!rpt.mode_changed);
        assert_eq!(dc.mode(), DriveMode::Velocity);
    }

    #[test]
    fn test_tank_drive_output() {
        let mut p = Params::default();
        p.use_tank_drive = true;
        p.square_inputs = true;
        let mut dc = ctrl(p);

        let (dems, _) = dc.proc(&frame(-0.5, -0.5, &[])).unwrap();
        assert_eq!(dems.output, OutputKind::TankDrive { square_inputs: true });
    }

    #[test]
    fn test_log_buttons() {
        let mut dc = ctrl(Params::default());

        let (_, rpt) = dc.proc(&frame(0.0, 0.0, &[button::RIGHT_BUMPER])).unwrap();
        assert!(rpt.log_requested);
    }

    #[test]
    fn test_disconnected_gamepad() {
        let mut dc = ctrl(Params::default());
        let mut f = frame(-1.0, -1.0, &[]);
        f.connected = false;

        assert!(matches!(dc.proc(&f), Err(DriveCtrlError::GamepadDisconnected)));
    }
}
