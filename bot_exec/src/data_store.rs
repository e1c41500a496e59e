//! # Data Store

use log::{info, warn};
use serde::Serialize;

use crate::{
    auto_ctrl,
    drive_ctrl,
    drivetrain::{DriveDemands, EncoderTm},
    mode_sched::RobotMode,
};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the robot has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize)]
pub enum SafeModeCause {
    GamepadDisconnected,
    HardwareError,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u64,

    /// Time of the current cycle since the start of the run
    pub time_s: f64,

    /// Mode the robot was last initialised into
    pub mode: Option<RobotMode>,

    // Safe mode variables
    /// Determines if the robot is in safe mode, with both motors neutral.
    pub safe: bool,

    /// The first cause still holding the robot in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    /// Every cause currently holding the robot in safe mode, oldest first.
    pub safe_causes: Vec<SafeModeCause>,

    // Sensing
    pub enc_tm: EncoderTm,

    // Control
    pub drive_dems: DriveDemands,
    pub drive_ctrl_status_rpt: drive_ctrl::StatusReport,
    pub auto_ctrl_status_rpt: auto_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Total number of cycles which ended with a hardware error
    pub num_hw_errors: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the robot into safe mode with the given cause.
    ///
    /// Causes accumulate, safe mode holds until every one of them is cleared.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe_causes.contains(&cause) {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe_causes.push(cause);
        }

        self.safe = true;
        self.safe_cause = self.safe_causes.first().copied();
    }

    /// Clears the given cause and disables safe mode if no other cause remains.
    ///
    /// Returns `Ok(())` if the robot is out of safe mode afterwards, or `Err(())` if some other
    /// cause is still active.
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if let Some(i) = self.safe_causes.iter().position(|&c| c == cause) {
            self.safe_causes.remove(i);
            self.safe_cause = self.safe_causes.first().copied();

            match self.safe_cause {
                Some(remaining) => info!(
                    "Safe mode cause {:?} cleared, still safe due to {:?}", cause, remaining
                ),
                None => info!(
                    "Make unsafe requested, cause {:?} cleared, safe mode disabled", cause
                ),
            }
        }

        self.safe = !self.safe_causes.is_empty();

        match self.safe {
            true => Err(()),
            false => Ok(()),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle.
    pub fn cycle_start(&mut self, time_s: f64) {
        self.time_s = time_s;
        self.drive_dems = DriveDemands::neutral();
        self.drive_ctrl_status_rpt = drive_ctrl::StatusReport::default();
        self.auto_ctrl_status_rpt = auto_ctrl::StatusReport::default();
    }
}
