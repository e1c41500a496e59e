//! # Hardware Interface Library
//!
//! Defines the interface between the robot software and the motor controller and gamepad
//! hardware. The vendor driver stack sits behind the traits defined here, the `sim` module
//! provides simple stand-ins used for running the executable headless.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Gamepad trait, frames and scripted events
pub mod gamepad;

/// Motor controller trait and the types used to command and configure it
pub mod motor;

/// Simulated devices
pub mod sim;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use gamepad::{Gamepad, GamepadEvent, GamepadFrame};
pub use motor::{
    ControlMode, Faults, HalError, MotorConfig, MotorController, MotorDemand, NeutralMode,
    PidGains,
};
