//! # Drivetrain
//!
//! Owns the two drive motor controllers and dispatches demands to them. Demands are issued either
//! directly as percent output, through the tank drive helper, or as velocity targets which the
//! controllers track with their onboard PID.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use hal_if::{HalError, MotorController, MotorDemand};
use log::{debug, info};
use serde::Serialize;
use util::maths::{clamp, sign_preserving_square};

use crate::{params::HardwareParams, units::Geometry};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Differential drivetrain with one controller per side.
pub struct Drivetrain<M: MotorController> {
    left: M,
    right: M,
    geometry: Geometry,
}

/// Demands for both sides of the drivetrain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DriveDemands {
    pub left: SideDemand,
    pub right: SideDemand,

    /// How percent output demands are issued.
    pub output: OutputKind,
}

/// Encoder telemetry for both sides of the drivetrain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EncoderTm {
    /// Units: inches
    pub left_pos_in: f64,

    /// Units: inches
    pub right_pos_in: f64,

    /// Units: inches/second
    pub left_vel_ips: f64,

    /// Units: inches/second
    pub right_vel_ips: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Demand for one side of the drivetrain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SideDemand {
    /// Fraction of the maximum output.
    Percent(f64),

    /// Wheel surface speed.
    ///
    /// Units: inches/second
    VelocityIps(f64),

    Neutral,
}

/// The way percent output demands reach the controllers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum OutputKind {
    /// Demands are sent to the controllers as they are.
    Direct,

    /// Demands pass through the tank drive helper, which limits them to ±1 and can square them.
    TankDrive { square_inputs: bool },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<M: MotorController> Drivetrain<M> {
    pub fn new(left: M, right: M, geometry: Geometry) -> Self {
        Self {
            left,
            right,
            geometry,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn left(&self) -> &M {
        &self.left
    }

    pub fn right(&self) -> &M {
        &self.right
    }

    /// Mutable access to both controllers, left first.
    pub fn controllers_mut(&mut self) -> (&mut M, &mut M) {
        (&mut self.left, &mut self.right)
    }

    /// Return both controllers to factory defaults and apply the drivetrain configuration.
    pub fn configure(&mut self, hw: &HardwareParams) -> Result<(), HalError> {
        self.left.config_factory_default()?;
        self.right.config_factory_default()?;

        self.left.configure(&hw.motor_config(&hw.left))?;
        self.right.configure(&hw.motor_config(&hw.right))?;

        info!(
            "Drivetrain configured (left: {}, right: {})",
            self.left.can_id(),
            self.right.can_id()
        );

        Ok(())
    }

    /// Set both encoders back to zero.
    pub fn zero_encoders(&mut self) -> Result<(), HalError> {
        self.left.set_selected_sensor_position(0.0)?;
        self.right.set_selected_sensor_position(0.0)
    }

    /// Send percent output demands directly to the controllers.
    pub fn set_percent(&mut self, left: f64, right: f64) -> Result<(), HalError> {
        self.left.set(MotorDemand::percent(left))?;
        self.right.set(MotorDemand::percent(right))
    }

    /// Drive each side with its own stick value through the tank drive helper.
    pub fn tank_drive(&mut self, left: f64, right: f64, square_inputs: bool) -> Result<(), HalError> {
        let shape = |value: f64| {
            let value = clamp(value, -1.0, 1.0);
            match square_inputs {
                true => sign_preserving_square(value),
                false => value,
            }
        };

        self.set_percent(shape(left), shape(right))
    }

    /// Send velocity targets to the controllers.
    pub fn set_velocity_ips(&mut self, left_ips: f64, right_ips: f64) -> Result<(), HalError> {
        let left_target = self.geometry.ips_to_ticks_per_100ms(left_ips);
        let right_target = self.geometry.ips_to_ticks_per_100ms(right_ips);

        debug!("targetL {:.1} targetR {:.1}", left_target, right_target);

        self.right.set(MotorDemand::velocity(right_target))?;
        self.left.set(MotorDemand::velocity(left_target))
    }

    /// Put both controllers into neutral.
    pub fn stop(&mut self) -> Result<(), HalError> {
        self.left.set(MotorDemand::neutral())?;
        self.right.set(MotorDemand::neutral())
    }

    /// Issue a pair of demands using the matching drive call.
    pub fn dispatch(&mut self, dems: &DriveDemands) -> Result<(), HalError> {
        match (dems.left, dems.right, dems.output) {
            (SideDemand::Percent(l), SideDemand::Percent(r), OutputKind::Direct) => {
                self.set_percent(l, r)
            }
            (SideDemand::Percent(l), SideDemand::Percent(r), OutputKind::TankDrive { square_inputs }) => {
                self.tank_drive(l, r, square_inputs)
            }
            (SideDemand::VelocityIps(l), SideDemand::VelocityIps(r), _) => {
                self.set_velocity_ips(l, r)
            }
            (l, r, _) => {
                // Mixed demands, issue each side on its own
                let left = self.to_motor_demand(l);
                let right = self.to_motor_demand(r);
                self.left.set(left)?;
                self.right.set(right)
            }
        }
    }

    /// Read both encoders and convert them into distances and speeds.
    pub fn read_encoders(&self) -> Result<EncoderTm, HalError> {
        Ok(EncoderTm {
            left_pos_in: self.geometry.ticks_to_in(self.left.selected_sensor_position()?),
            right_pos_in: self.geometry.ticks_to_in(self.right.selected_sensor_position()?),
            left_vel_ips: self
                .geometry
                .ticks_per_100ms_to_ips(self.left.selected_sensor_velocity()?),
            right_vel_ips: self
                .geometry
                .ticks_per_100ms_to_ips(self.right.selected_sensor_velocity()?),
        })
    }

    /// Describe any sensor phase faults, or `None` if both sensors are in phase.
    ///
    /// The controllers only detect the fault while driven at 25% or more.
    pub fn check_faults(&self) -> Result<Option<String>, HalError> {
        let mut log = String::new();

        if self.left.faults()?.sensor_out_of_phase {
            log.push_str(" L sensor is out of phase");
        }
        if self.right.faults()?.sensor_out_of_phase {
            log.push_str(" R sensor is out of phase");
        }

        match log.is_empty() {
            true => Ok(None),
            false => Ok(Some(log)),
        }
    }

    fn to_motor_demand(&self, dem: SideDemand) -> MotorDemand {
        match dem {
            SideDemand::Percent(p) => MotorDemand::percent(p),
            SideDemand::VelocityIps(v) => {
                MotorDemand::velocity(self.geometry.ips_to_ticks_per_100ms(v))
            }
            SideDemand::Neutral => MotorDemand::neutral(),
        }
    }
}

impl DriveDemands {
    /// Percent output on both sides, sent directly.
    pub fn percent(left: f64, right: f64) -> Self {
        Self {
            left: SideDemand::Percent(left),
            right: SideDemand::Percent(right),
            output: OutputKind::Direct,
        }
    }

    pub fn neutral() -> Self {
        Self {
            left: SideDemand::Neutral,
            right: SideDemand::Neutral,
            output: OutputKind::Direct,
        }
    }
}

impl Default for DriveDemands {
    fn default() -> Self {
        Self::neutral()
    }
}

impl SideDemand {
    /// The demand value, in percent or inches/second, with neutral as zero.
    pub fn value(&self) -> f64 {
        match *self {
            SideDemand::Percent(v) | SideDemand::VelocityIps(v) => v,
            SideDemand::Neutral => 0.0,
        }
    }

    /// Short name of the units of `value`.
    pub fn units(&self) -> &'static str {
        match self {
            SideDemand::Percent(_) => "percent",
            SideDemand::VelocityIps(_) => "ips",
            SideDemand::Neutral => "neutral",
        }
    }
}

impl EncoderTm {
    /// Average distance travelled by both sides.
    ///
    /// Units: inches
    pub fn avg_distance_in(&self) -> f64 {
        (self.left_pos_in + self.right_pos_in) / 2.0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hal_if::{
        sim::{SimMotorController, Simulated},
        ControlMode,
    };
    use std::f64::consts::PI;

    const PARAMS: &str = include_str!("../../params/bot_exec.toml");

    fn drivetrain() -> Drivetrain<SimMotorController> {
        Drivetrain::new(
            SimMotorController::new(10),
            SimMotorController::new(20),
            Geometry::default(),
        )
    }

    fn run(dt: &mut Drivetrain<SimMotorController>, seconds: f64) {
        for _ in 0..(seconds / 0.02).round() as usize {
            let (l, r) = dt.controllers_mut();
            l.step(0.02);
            r.step(0.02);
        }
    }

    #[test]
    fn test_configure() {
        let params: crate::params::BotExecParams = toml::from_str(PARAMS).unwrap();
        let mut dt = drivetrain();
        dt.configure(&params.hardware).unwrap();

        assert!(dt.left().config().inverted);
        assert!(!dt.right().config().inverted);
        assert_eq!(dt.left().config().gains.kp, 0.1);
        assert_eq!(dt.right().config().timeout_ms, 30);
        assert_eq!(dt.right().config().neutral_mode, hal_if::NeutralMode::Brake);
    }

    #[test]
    fn test_tank_drive_limits_and_squares() {
        let mut dt = drivetrain();

        dt.tank_drive(1.5, -0.5, false).unwrap();
        assert_eq!(dt.left().demand(), MotorDemand::percent(1.0));
        assert_eq!(dt.right().demand(), MotorDemand::percent(-0.5));

        dt.tank_drive(0.5, -0.5, true).unwrap();
        assert_eq!(dt.left().demand(), MotorDemand::percent(0.25));
        assert_eq!(dt.right().demand(), MotorDemand::percent(-0.25));
    }

    #[test]
    fn test_direct_percent_is_unshaped() {
        let mut dt = drivetrain();
        dt.dispatch(&DriveDemands::percent(0.45, -0.3)).unwrap();

        assert_eq!(dt.left().demand(), MotorDemand::percent(0.45));
        assert_eq!(dt.right().demand(), MotorDemand::percent(-0.3));
    }

    #[test]
    fn test_velocity_dispatch_converts_units() {
        let mut dt = drivetrain();
        dt.dispatch(&DriveDemands {
            left: SideDemand::VelocityIps(150.0),
            right: SideDemand::VelocityIps(-75.0),
            output: OutputKind::Direct,
        })
        .unwrap();

        let left = dt.left().demand();
        assert_eq!(left.mode, ControlMode::Velocity);
        assert!((left.value - 150.0 * 4096.0 / (10.0 * PI * 4.5)).abs() < 1e-9);
        assert!((dt.right().demand().value + 75.0 * 4096.0 / (10.0 * PI * 4.5)).abs() < 1e-9);
    }

    #[test]
    fn test_mixed_dispatch() {
        let mut dt = drivetrain();
        dt.dispatch(&DriveDemands {
            left: SideDemand::Percent(0.2),
            right: SideDemand::Neutral,
            output: OutputKind::TankDrive { square_inputs: true },
        })
        .unwrap();

        assert_eq!(dt.left().demand(), MotorDemand::percent(0.2));
        assert_eq!(dt.right().demand(), MotorDemand::neutral());
    }

    #[test]
    fn test_read_and_zero_encoders() {
        let mut dt = drivetrain();
        dt.set_percent(0.5, 0.5).unwrap();
        run(&mut dt, 2.0);

        let tm = dt.read_encoders().unwrap();
        assert!(tm.left_pos_in > 0.0);
        assert!((tm.left_pos_in - tm.right_pos_in).abs() < 1e-9);

        // 730 ticks/100ms at half output
        let expected_ips = 730.0 / 4096.0 * PI * 4.5 * 10.0;
        assert!((tm.left_vel_ips - expected_ips).abs() < 0.1);
        assert!((tm.avg_distance_in() - tm.left_pos_in).abs() < 1e-9);

        dt.zero_encoders().unwrap();
        let tm = dt.read_encoders().unwrap();
        assert_eq!(tm.left_pos_in, 0.0);
        assert_eq!(tm.right_pos_in, 0.0);
    }

    #[test]
    fn test_check_faults() {
        let mut dt = Drivetrain::new(
            SimMotorController::new(10),
            SimMotorController::new(20).with_sensor_reversed(true),
            Geometry::default(),
        );
        assert_eq!(dt.check_faults().unwrap(), None);

        dt.set_percent(0.5, 0.5).unwrap();
        run(&mut dt, 0.5);

        assert_eq!(
            dt.check_faults().unwrap(),
            Some(String::from(" R sensor is out of phase"))
        );
    }

    #[test]
    fn test_stop() {
        let mut dt = drivetrain();
        dt.set_percent(0.5, 0.5).unwrap();
        dt.stop().unwrap();

        assert_eq!(dt.left().demand(), MotorDemand::neutral());
        assert_eq!(dt.right().demand(), MotorDemand::neutral());
    }
}
