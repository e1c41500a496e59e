//! # MiniBot library.
//!
//! This library allows the executable, and anything else in the workspace, to access the items
//! defined inside the bot crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autonomous control - drives a fixed distance forward at constant power
pub mod auto_ctrl;

/// Global data store for the executable
pub mod data_store;

/// Drive control - converts gamepad sticks into drivetrain demands
pub mod drive_ctrl;

/// Drivetrain - owns the motor controllers and dispatches demands to them
pub mod drivetrain;

/// Mode scheduling - decides which mode the robot runs in at any point in a match
pub mod mode_sched;

/// Executable parameters
pub mod params;

/// The robot and its periodic callbacks
pub mod robot;

/// Wheel geometry and encoder unit conversions
pub mod units;
