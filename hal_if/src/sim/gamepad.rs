//! Simulated gamepad

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, warn};

use crate::gamepad::{Gamepad, GamepadEvent, GamepadFrame};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A gamepad whose state is set by [`GamepadEvent`]s.
#[derive(Debug, Clone)]
pub struct SimGamepad {
    port: u8,
    state: GamepadFrame,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimGamepad {
    /// Create a connected gamepad with all sticks centred and all buttons released.
    pub fn new(port: u8) -> Self {
        Self {
            port,
            state: GamepadFrame {
                connected: true,
                ..Default::default()
            },
        }
    }

    /// Apply an event to the gamepad state.
    pub fn apply(&mut self, event: &GamepadEvent) {
        debug!("Gamepad {} event: {:?}", self.port, event);

        match *event {
            GamepadEvent::Axis { axis, value } => match self.state.axes.get_mut(axis) {
                Some(a) => *a = value.max(-1.0).min(1.0),
                None => warn!("Gamepad {} has no axis {}", self.port, axis),
            },
            GamepadEvent::Press { button } => self.set_button(button, true),
            GamepadEvent::Release { button } => self.set_button(button, false),
            GamepadEvent::Disconnect => self.state.connected = false,
            GamepadEvent::Connect => self.state.connected = true,
        }
    }

    fn set_button(&mut self, button: usize, pressed: bool) {
        match button
            .checked_sub(1)
            .and_then(|i| self.state.buttons.get_mut(i))
        {
            Some(b) => *b = pressed,
            None => warn!("Gamepad {} has no button {}", self.port, button),
        }
    }
}

impl Gamepad for SimGamepad {
    fn port(&self) -> u8 {
        self.port
    }

    fn is_connected(&self) -> bool {
        self.state.connected
    }

    fn raw_axis(&self, axis: usize) -> f64 {
        match self.state.connected {
            true => self.state.axis(axis),
            false => 0.0,
        }
    }

    fn raw_button(&self, button: usize) -> bool {
        self.state.connected && self.state.button(button)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gamepad::{axis, button};

    #[test]
    fn test_events_update_state() {
        let mut gp = SimGamepad::new(0);

        gp.apply(&GamepadEvent::Axis {
            axis: axis::LEFT_Y,
            value: -0.7,
        });
        gp.apply(&GamepadEvent::Press { button: button::B });

        assert_eq!(gp.raw_axis(axis::LEFT_Y), -0.7);
        assert!(gp.raw_button(button::B));

        let frame = GamepadFrame::capture(&gp);
        assert!(frame.connected);
        assert_eq!(frame.axis(axis::LEFT_Y), -0.7);
        assert!(frame.button(button::B));
        assert!(!frame.button(button::A));

        gp.apply(&GamepadEvent::Release { button: button::B });
        assert!(!gp.raw_button(button::B));
    }

    #[test]
    fn test_axis_is_clamped() {
        let mut gp = SimGamepad::new(0);
        gp.apply(&GamepadEvent::Axis {
            axis: axis::RIGHT_Y,
            value: 3.0,
        });

        assert_eq!(gp.raw_axis(axis::RIGHT_Y), 1.0);
    }

    #[test]
    fn test_disconnected_reads_neutral() {
        let mut gp = SimGamepad::new(0);
        gp.apply(&GamepadEvent::Axis {
            axis: axis::LEFT_Y,
            value: 0.9,
        });
        gp.apply(&GamepadEvent::Press { button: button::A });
        gp.apply(&GamepadEvent::Disconnect);

        assert!(!gp.is_connected());
        assert_eq!(gp.raw_axis(axis::LEFT_Y), 0.0);
        assert!(!gp.raw_button(button::A));

        gp.apply(&GamepadEvent::Connect);
        assert_eq!(gp.raw_axis(axis::LEFT_Y), 0.9);
    }

    #[test]
    fn test_unknown_button_is_ignored() {
        let mut gp = SimGamepad::new(0);
        gp.apply(&GamepadEvent::Press { button: 0 });
        gp.apply(&GamepadEvent::Press { button: 99 });

        assert_eq!(GamepadFrame::capture(&gp).buttons, [false; 10]);
    }
}
