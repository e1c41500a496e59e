//! Drive control module
//!
//! Converts the driver's gamepad input into drivetrain demands during the teleoperated period.
//! Each stick drives one side of the robot (tank style), either as a percent output or as a
//! velocity target.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How stick input is turned into motor commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveMode {
    /// Sticks scaled by the percent gain and sent as percent output.
    Percent,

    /// Sticks scaled by the maximum velocity and tracked in closed loop.
    Velocity,
}

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("DriveCtrl has not been initialised")]
    NotInitialised,

    #[error("The gamepad is not connected")]
    GamepadDisconnected,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp values inside the deadband to zero.
///
/// Values outside the deadband pass through unscaled.
pub fn apply_deadband(value: f64, deadband: f64) -> f64 {
    if value.abs() < deadband {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_apply_deadband() {
        assert_eq!(apply_deadband(0.05, 0.1), 0.0);
        assert_eq!(apply_deadband(-0.099, 0.1), 0.0);
        assert_eq!(apply_deadband(0.1, 0.1), 0.1);
        assert_eq!(apply_deadband(-0.5, 0.1), -0.5);
        assert_eq!(apply_deadband(1.0, 0.1), 1.0);
    }
}
