//! # Mode scheduling
//!
//! Decides which mode the robot is in at a given time, standing in for the competition runtime
//! which normally makes that decision.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The modes the runtime can put the robot in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RobotMode {
    Disabled,
    Autonomous,
    Teleop,
}

/// Timeline of modes over a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchTimeline {
    /// Stay in one mode, optionally for a limited time.
    Fixed {
        mode: RobotMode,
        duration_s: Option<f64>,
    },

    /// Autonomous followed by teleop, as in a competition match.
    Match {
        auto_duration_s: f64,
        teleop_duration_s: f64,
    },
}

/// The timelines which can be requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineKind {
    Auto,
    Teleop,
    Disabled,
    Match,
}

#[derive(Debug, Error)]
#[error("Unknown mode \"{0}\", expected one of auto, teleop, disabled or match")]
pub struct ParseTimelineError(String);

#[derive(Debug, Error, PartialEq)]
#[error(
    "A fast run in {0:?} mode never ends by itself, give a duration or a gamepad script"
)]
pub struct UnboundedRunError(pub RobotMode);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MatchTimeline {
    /// Mode at `time_s` seconds into the run, or `None` once the run is over.
    pub fn mode_at(&self, time_s: f64) -> Option<RobotMode> {
        match *self {
            MatchTimeline::Fixed { mode, duration_s } => match duration_s {
                Some(d) if time_s >= d => None,
                _ => Some(mode),
            },
            MatchTimeline::Match {
                auto_duration_s,
                teleop_duration_s,
            } => {
                if time_s < auto_duration_s {
                    Some(RobotMode::Autonomous)
                } else if time_s < auto_duration_s + teleop_duration_s {
                    Some(RobotMode::Teleop)
                } else {
                    None
                }
            }
        }
    }

    /// True if the timeline never ends by itself.
    pub fn is_open_ended(&self) -> bool {
        matches!(self, MatchTimeline::Fixed { duration_s: None, .. })
    }

    /// Check that a run which doesn't sleep between cycles will end.
    ///
    /// An open ended timeline only ends at the end of a gamepad script.
    pub fn check_fast_run(&self, has_script: bool) -> Result<(), UnboundedRunError> {
        match *self {
            MatchTimeline::Fixed { mode, duration_s: None } if !has_script => {
                Err(UnboundedRunError(mode))
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for TimelineKind {
    type Err = ParseTimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" | "autonomous" => Ok(TimelineKind::Auto),
            "teleop" => Ok(TimelineKind::Teleop),
            "disabled" => Ok(TimelineKind::Disabled),
            "match" => Ok(TimelineKind::Match),
            _ => Err(ParseTimelineError(s.to_string())),
        }
    }
}

impl TimelineKind {
    /// Build the timeline, `duration_s` only applies to the fixed mode kinds.
    pub fn timeline(
        &self,
        duration_s: Option<f64>,
        auto_duration_s: f64,
        teleop_duration_s: f64,
    ) -> MatchTimeline {
        let fixed = |mode| MatchTimeline::Fixed { mode, duration_s };

        match self {
            TimelineKind::Auto => fixed(RobotMode::Autonomous),
            TimelineKind::Teleop => fixed(RobotMode::Teleop),
            TimelineKind::Disabled => fixed(RobotMode::Disabled),
            TimelineKind::Match => MatchTimeline::Match {
                auto_duration_s,
                teleop_duration_s,
            },
        }
    }
}
