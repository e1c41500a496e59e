//! Autonomous control module
//!
//! Drives the robot straight forward at a constant power until the average
//! encoder distance reaches the target, then stops.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::drivetrain::{DriveDemands, EncoderTm};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for autonomous control.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Params {
    /// Distance to drive before stopping.
    ///
    /// Units: inches
    pub target_distance_in: f64,

    /// Percent output while driving to the target.
    pub drive_power: f64,
}

/// Autonomous control module state
#[derive(Default)]
pub struct AutoCtrl {
    params: Option<Params>,

    target_reached: bool,
}

/// Status report for AutoCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Units: inches
    pub avg_distance_in: f64,

    pub target_reached: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AutoCtrlError {
    #[error("AutoCtrl has not been initialised")]
    NotInitialised,

    #[error("The target distance must be positive, found {0}")]
    InvalidTargetDistance(f64),

    #[error("The drive power must be between -1 and 1, found {0}")]
    InvalidDrivePower(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Determines if the parameters are valid.
    pub fn are_valid(&self) -> Result<(), AutoCtrlError> {
        if !(self.target_distance_in > 0.0) {
            return Err(AutoCtrlError::InvalidTargetDistance(self.target_distance_in));
        }
        if !(-1.0..=1.0).contains(&self.drive_power) {
            return Err(AutoCtrlError::InvalidDrivePower(self.drive_power));
        }
        Ok(())
    }
}

impl State for AutoCtrl {
    type InitData = Params;
    type InitError = AutoCtrlError;

    type InputData = EncoderTm;
    type OutputData = DriveDemands;
    type StatusReport = StatusReport;
    type ProcError = AutoCtrlError;

    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        init_data.are_valid()?;
        self.params = Some(init_data);
        self.reset();
        Ok(())
    }

    /// Choose between the drive power and stopping based on the distance
    /// travelled so far.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let params = self.params.ok_or(AutoCtrlError::NotInitialised)?;

        let avg_distance_in = input_data.avg_distance_in();

        let power = if avg_distance_in < params.target_distance_in {
            params.drive_power
        }
        else {
            if !self.target_reached {
                info!(
                    "Autonomous target of {:.1} in reached ({:.2} in)",
                    params.target_distance_in,
                    avg_distance_in
                );
                self.target_reached = true;
            }
            0.0
        };

        Ok((
            DriveDemands::percent(power, power),
            StatusReport {
                avg_distance_in,
                target_reached: self.target_reached
            }
        ))
    }
}

impl AutoCtrl {
    /// Prepare for a new autonomous run.
    pub fn reset(&mut self) {
        self.target_reached = false;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::drivetrain::SideDemand;

    fn ctrl() -> AutoCtrl {
        let mut ac = AutoCtrl::default();
        ac.init(toml::from_str(include_str!("../../params/auto_ctrl.toml")).unwrap())
            .unwrap();
        ac
    }

    fn tm(left_pos_in: f64, right_pos_in: f64) -> EncoderTm {
        EncoderTm {
            left_pos_in,
            right_pos_in,
            ..Default::default()
        }
    }

    #[test]
    fn test_drives_until_target() {
        let mut ac = ctrl();

        let (dems, rpt) = ac.proc(&tm(0.0, 0.0)).unwrap();
        assert_eq!(dems, DriveDemands::percent(0.4, 0.4));
        assert!(!rpt.target_reached);

        // Average is what matters, not either side alone
        let (dems, rpt) = ac.proc(&tm(50.0, 45.0)).unwrap();
        assert_eq!(dems.left, SideDemand::Percent(0.4));
        assert_eq!(rpt.avg_distance_in, 47.5);

        let (dems, rpt) = ac.proc(&tm(48.0, 48.0)).unwrap();
        assert_eq!(dems, DriveDemands::percent(0.0, 0.0));
        assert!(rpt.target_reached);
    }

    #[test]
    fn test_resumes_if_pushed_back() {
        let mut ac = ctrl();
        ac.proc(&tm(60.0, 60.0)).unwrap();

        // Purely a threshold, so it drives again below the target
        let (dems, rpt) = ac.proc(&tm(40.0, 40.0)).unwrap();
        assert_eq!(dems, DriveDemands::percent(0.4, 0.4));
        assert!(rpt.target_reached);

        ac.reset();
        let (_, rpt) = ac.proc(&tm(40.0, 40.0)).unwrap();
        assert!(!rpt.target_reached);
    }

    #[test]
    fn test_not_initialised() {
        let mut ac = AutoCtrl::default();
        assert!(matches!(
            ac.proc(&tm(0.0, 0.0)),
            Err(AutoCtrlError::NotInitialised)
        ));
    }

    #[test]
    fn test_invalid_params() {
        let mut ac = AutoCtrl::default();
        assert!(ac.init(Params { target_distance_in: 0.0, drive_power: 0.4 }).is_err());
        assert!(ac.init(Params { target_distance_in: 48.0, drive_power: 1.4 }).is_err());
    }
}
