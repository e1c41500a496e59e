//! # Gamepad Interface
//!
//! Axes are numbered from 0 and buttons from 1, following the driver station numbering.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of axes reported by the gamepad.
pub const NUM_AXES: usize = 6;

/// Number of buttons reported by the gamepad.
pub const NUM_BUTTONS: usize = 10;

/// Axis indexes on an XInput gamepad.
pub mod axis {
    pub const LEFT_X: usize = 0;
    pub const LEFT_Y: usize = 1;
    pub const LEFT_TRIGGER: usize = 2;
    pub const RIGHT_TRIGGER: usize = 3;
    pub const RIGHT_X: usize = 4;
    pub const RIGHT_Y: usize = 5;
}

/// Button indexes on an XInput gamepad.
pub mod button {
    pub const A: usize = 1;
    pub const B: usize = 2;
    pub const X: usize = 3;
    pub const Y: usize = 4;
    pub const LEFT_BUMPER: usize = 5;
    pub const RIGHT_BUMPER: usize = 6;
    pub const BACK: usize = 7;
    pub const START: usize = 8;
    pub const LEFT_STICK: usize = 9;
    pub const RIGHT_STICK: usize = 10;
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A gamepad attached to the driver station.
pub trait Gamepad {
    /// Driver station port the gamepad is plugged into.
    fn port(&self) -> u8;

    fn is_connected(&self) -> bool;

    /// Value of the axis between -1 and +1. Unknown axes read as 0.
    fn raw_axis(&self, axis: usize) -> f64;

    /// State of the button. Unknown buttons read as released.
    fn raw_button(&self, button: usize) -> bool;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Snapshot of the gamepad taken at the start of a cycle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct GamepadFrame {
    pub connected: bool,

    pub axes: [f64; NUM_AXES],

    /// Button states, `buttons[0]` is button 1.
    pub buttons: [bool; NUM_BUTTONS],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A change to the state of a gamepad, used to drive the simulated gamepad from scripts.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GamepadEvent {
    Axis { axis: usize, value: f64 },
    Press { button: usize },
    Release { button: usize },
    Disconnect,
    Connect,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GamepadFrame {
    /// Read every axis and button of the gamepad.
    pub fn capture<G: Gamepad + ?Sized>(gamepad: &G) -> Self {
        let mut frame = GamepadFrame {
            connected: gamepad.is_connected(),
            ..Default::default()
        };

        for (i, a) in frame.axes.iter_mut().enumerate() {
            *a = gamepad.raw_axis(i);
        }
        for (i, b) in frame.buttons.iter_mut().enumerate() {
            *b = gamepad.raw_button(i + 1);
        }

        frame
    }

    pub fn axis(&self, axis: usize) -> f64 {
        self.axes.get(axis).copied().unwrap_or(0.0)
    }

    pub fn button(&self, button: usize) -> bool {
        match button {
            0 => false,
            b => self.buttons.get(b - 1).copied().unwrap_or(false),
        }
    }
}

impl GamepadEvent {
    /// Parse an event from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_event_from_json() {
        assert_eq!(
            GamepadEvent::from_json(r#"{"type": "axis", "axis": 1, "value": -0.5}"#).unwrap(),
            GamepadEvent::Axis {
                axis: 1,
                value: -0.5
            }
        );
        assert_eq!(
            GamepadEvent::from_json(r#"{"type": "press", "button": 2}"#).unwrap(),
            GamepadEvent::Press { button: 2 }
        );
        assert_eq!(
            GamepadEvent::from_json(r#"{"type": "disconnect"}"#).unwrap(),
            GamepadEvent::Disconnect
        );
        assert!(GamepadEvent::from_json(r#"{"type": "rumble"}"#).is_err());
    }

    #[test]
    fn test_frame_out_of_range() {
        let frame = GamepadFrame::default();

        assert_eq!(frame.axis(42), 0.0);
        assert!(!frame.button(0));
        assert!(!frame.button(42));
    }
}
