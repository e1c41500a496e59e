//! # Encoder unit conversions
//!
//! Converts between raw encoder units and distances travelled by the wheel. Velocities reported by
//! the controllers are per 100 ms.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of 100 ms periods in a second.
const PERIODS_PER_SECOND: f64 = 10.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Wheel and encoder geometry shared by both sides of the drivetrain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Units: inches
    pub wheel_diameter_in: f64,

    /// Encoder ticks per wheel revolution
    pub ticks_per_rev: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Geometry {
    fn default() -> Self {
        Self {
            wheel_diameter_in: 4.5,
            ticks_per_rev: 4096.0,
        }
    }
}

impl Geometry {
    /// Wheel circumference.
    ///
    /// Units: inches
    pub fn circumference_in(&self) -> f64 {
        PI * self.wheel_diameter_in
    }

    /// Convert an encoder position into distance travelled.
    pub fn ticks_to_in(&self, ticks: f64) -> f64 {
        (ticks / self.ticks_per_rev) * self.circumference_in()
    }

    /// Convert an encoder velocity into inches per second.
    pub fn ticks_per_100ms_to_ips(&self, ticks_per_100ms: f64) -> f64 {
        (ticks_per_100ms / self.ticks_per_rev) * self.circumference_in() * PERIODS_PER_SECOND
    }

    /// Convert inches per second into an encoder velocity target.
    pub fn ips_to_ticks_per_100ms(&self, ips: f64) -> f64 {
        ips * self.ticks_per_rev / (PERIODS_PER_SECOND * self.circumference_in())
    }

    pub fn is_valid(&self) -> bool {
        self.wheel_diameter_in > 0.0 && self.ticks_per_rev > 0.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_one_revolution() {
        let geom = Geometry::default();

        assert!(approx(geom.ticks_to_in(4096.0), PI * 4.5));
        assert!(approx(geom.ticks_to_in(-2048.0), -PI * 4.5 / 2.0));
    }

    #[test]
    fn test_velocity_conversions() {
        let geom = Geometry::default();

        // One revolution per 100 ms is ten per second
        assert!(approx(geom.ticks_per_100ms_to_ips(4096.0), PI * 4.5 * 10.0));

        // Full speed teleop target
        assert!(approx(
            geom.ips_to_ticks_per_100ms(150.0),
            150.0 * 4096.0 / (10.0 * PI * 4.5)
        ));

        let ips = 37.5;
        assert!(approx(
            geom.ticks_per_100ms_to_ips(geom.ips_to_ticks_per_100ms(ips)),
            ips
        ));
    }

    #[test]
    fn test_validity() {
        assert!(Geometry::default().is_valid());
        assert!(!Geometry {
            wheel_diameter_in: 0.0,
            ticks_per_rev: 4096.0
        }
        .is_valid());
    }
}
