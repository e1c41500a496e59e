//! # Simulated Devices
//!
//! Stand-ins for the motor controllers and gamepad which allow the executable to run without
//! any hardware attached. These are deliberately simple and make no attempt to model the
//! electrical or closed loop behaviour of real controllers.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod gamepad;
mod motor;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use gamepad::SimGamepad;
pub use motor::{SimMotorController, DEFAULT_FREE_SPEED_TICKS_PER_100MS};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A simulated device which evolves over time.
pub trait Simulated {
    /// Advance the simulation by `dt_s` seconds.
    fn step(&mut self, dt_s: f64);
}
