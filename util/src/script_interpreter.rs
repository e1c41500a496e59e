//! # Gamepad script interpreter module
//!
//! This module provides an interpreter for gamepad scripts, allowing the
//! robot to be driven without a driver station.
//!
//! A script is made up of entries of the form `<time_s>: <event JSON>;`, for
//! example:
//!
//! ```text
//! 0.5: {"type": "axis", "axis": 1, "value": -0.8};
//! 2.0: {"type": "press", "button": 2};
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::Path;
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use hal_if::GamepadEvent;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An event which is scripted to occur at a specific time.
#[derive(Debug, Clone, Copy)]
struct ScriptedEvent {
    /// The time the event is supposed to occur at
    exec_time_s: f64,

    event: GamepadEvent
}

/// A script interpreter.
///
/// After initialising with the script to run use `.get_pending_events` to
/// acquire a list of events that need applying.
pub struct ScriptInterpreter {
    events: VecDeque<ScriptedEvent>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid event at {0} s: {1}")]
    InvalidEvent(f64, serde_json::Error)
}

#[derive(Debug, PartialEq)]
pub enum PendingEvents {
    None,
    Some(Vec<GamepadEvent>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let script = fs::read_to_string(script_path)
            .map_err(ScriptError::ScriptLoadError)?;

        Self::parse(&script)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn parse(script: &str) -> Result<Self, ScriptError> {
        // Go through the script executing __the magic regex__. The pattern is
        // a constant so building it cannot fail.
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("script regex is valid");

        let mut events: Vec<ScriptedEvent> = vec![];

        for cap in re.captures_iter(script) {
            // Parse the exec time
            let exec_time_s: f64 = cap[1]
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            // Parse the event from the payload
            let event = GamepadEvent::from_json(&cap[3])
                .map_err(|e| ScriptError::InvalidEvent(exec_time_s, e))?;

            events.push(ScriptedEvent {
                exec_time_s,
                event
            });
        }

        if events.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        // Stable sort keeps same-time events in the order they were written
        events.sort_by(|a, b| a.exec_time_s
            .partial_cmp(&b.exec_time_s)
            .unwrap_or(std::cmp::Ordering::Equal));

        Ok(ScriptInterpreter {
            events: events.into()
        })
    }

    /// Return all events due at or before `current_time_s`.
    pub fn get_pending_events(&mut self, current_time_s: f64) -> PendingEvents {

        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.events.is_empty() {
            return PendingEvents::EndOfScript
        }

        let mut event_vec: Vec<GamepadEvent> = vec![];

        // Pop events from the front of the queue until the next one is in
        // the future.
        while let Some(e) = self.events.front() {
            if e.exec_time_s > current_time_s {
                break;
            }
            event_vec.push(e.event);
            self.events.pop_front();
        }

        if event_vec.is_empty() {
            PendingEvents::None
        }
        else {
            PendingEvents::Some(event_vec)
        }
    }

    /// Get the number of events remaining in the script
    pub fn get_num_events(&self) -> usize {
        self.events.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.events.back() {
            Some(e) => e.exec_time_s,
            None => 0f64
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SCRIPT: &str = r#"
        // Drive forward then switch to velocity mode
        0.5: {"type": "axis", "axis": 1, "value": -0.8};
        0.0: {"type": "axis", "axis": 5, "value": -0.8};
        2.0: {"type": "press", "button": 2};
        2.0: {"type": "release", "button": 2};
    "#;

    #[test]
    fn test_parse() {
        let si = ScriptInterpreter::parse(SCRIPT).unwrap();

        assert_eq!(si.get_num_events(), 4);
        assert_eq!(si.get_duration(), 2.0);
    }

    #[test]
    fn test_pending_events_in_time_order() {
        let mut si = ScriptInterpreter::parse(SCRIPT).unwrap();

        assert_eq!(
            si.get_pending_events(0.0),
            PendingEvents::Some(vec![GamepadEvent::Axis { axis: 5, value: -0.8 }])
        );
        assert_eq!(si.get_pending_events(0.2), PendingEvents::None);
        assert_eq!(
            si.get_pending_events(0.5),
            PendingEvents::Some(vec![GamepadEvent::Axis { axis: 1, value: -0.8 }])
        );
        assert_eq!(
            si.get_pending_events(5.0),
            PendingEvents::Some(vec![
                GamepadEvent::Press { button: 2 },
                GamepadEvent::Release { button: 2 },
            ])
        );
        assert_eq!(si.get_pending_events(6.0), PendingEvents::EndOfScript);
    }

    #[test]
    fn test_empty_script() {
        assert!(matches!(
            ScriptInterpreter::parse("// nothing to see here\n"),
            Err(ScriptError::ScriptEmpty)
        ));
    }

    #[test]
    fn test_invalid_event() {
        assert!(matches!(
            ScriptInterpreter::parse(r#"1.0: {"type": "wiggle"};"#),
            Err(ScriptError::InvalidEvent(t, _)) if t == 1.0
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ScriptInterpreter::new("/definitely/not/a/script.gps"),
            Err(ScriptError::ScriptLoadError(_))
        ));
    }
}
