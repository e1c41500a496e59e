//! # Robot
//!
//! Ties the drivetrain, gamepad and control modules together behind the periodic callbacks the
//! competition runtime invokes. Each mode has an `*_init` function, called once when the robot
//! enters the mode, and a `*_periodic` function called every cycle while it stays there.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use hal_if::{sim::Simulated, Gamepad, GamepadFrame, HalError, MotorController};
use log::{error, info, warn};
use serde::Serialize;
use thiserror::Error;

// Internal
use crate::{
    auto_ctrl::{self, AutoCtrl},
    data_store::{DataStore, SafeModeCause},
    drive_ctrl::{self, DriveCtrl, DriveCtrlError, DriveMode},
    drivetrain::Drivetrain,
    mode_sched::RobotMode,
    params::{BotExecParams, HardwareParams},
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The robot and everything it controls.
pub struct Robot<M: MotorController, G: Gamepad> {
    drivetrain: Drivetrain<M>,
    gamepad: G,
    hardware: HardwareParams,

    drive_ctrl: DriveCtrl,
    auto_ctrl: AutoCtrl,

    ds: DataStore,

    /// Last sensor phase fault message, so that faults are only reported when they change
    last_fault: Option<String>,

    arch_cycle_tm: Option<Archiver>,
}

/// One row of the per-cycle telemetry archive.
#[derive(Debug, Serialize)]
struct CycleTm {
    time_s: f64,
    cycle: u64,
    mode: Option<RobotMode>,
    safe: bool,
    drive_mode: DriveMode,
    left_demand: f64,
    right_demand: f64,
    demand_units: &'static str,
    left_pos_in: f64,
    right_pos_in: f64,
    left_vel_ips: f64,
    right_vel_ips: f64,
}

/// Summary of a run, saved when the executable exits.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub num_cycles: u64,
    pub duration_s: f64,
    pub final_mode: Option<RobotMode>,
    pub left_pos_in: f64,
    pub right_pos_in: f64,
    pub num_hw_errors: u64,
    pub safe: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum RobotError {
    #[error("Failed to initialise DriveCtrl: {0}")]
    DriveCtrlInit(#[from] drive_ctrl::ParamsError),

    #[error("Failed to initialise AutoCtrl: {0}")]
    AutoCtrlInit(#[from] auto_ctrl::AutoCtrlError),

    #[error("Hardware error: {0}")]
    Hal(#[from] HalError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<M: MotorController, G: Gamepad> Robot<M, G> {
    /// Build the robot and initialise its control modules.
    ///
    /// The hardware is not touched until [`Robot::robot_init`].
    pub fn new(
        left: M,
        right: M,
        gamepad: G,
        params: &BotExecParams,
        drive_params: drive_ctrl::Params,
        auto_params: auto_ctrl::Params,
    ) -> Result<Self, RobotError> {
        let mut drive_ctrl = DriveCtrl::default();
        drive_ctrl.init(drive_params)?;

        let mut auto_ctrl = AutoCtrl::default();
        auto_ctrl.init(auto_params)?;

        Ok(Self {
            drivetrain: Drivetrain::new(left, right, params.geometry),
            gamepad,
            hardware: params.hardware.clone(),
            drive_ctrl,
            auto_ctrl,
            ds: DataStore::default(),
            last_fault: None,
            arch_cycle_tm: None,
        })
    }

    /// Start writing per-cycle telemetry into the session archive.
    pub fn enable_archive(&mut self, session: &Session) -> Result<(), ArchiveError> {
        self.arch_cycle_tm = Some(Archiver::from_path(session, "bot_exec/cycle_tm.csv")?);
        Ok(())
    }

    pub fn data_store(&self) -> &DataStore {
        &self.ds
    }

    pub fn data_store_mut(&mut self) -> &mut DataStore {
        &mut self.ds
    }

    pub fn drivetrain(&self) -> &Drivetrain<M> {
        &self.drivetrain
    }

    pub fn drivetrain_mut(&mut self) -> &mut Drivetrain<M> {
        &mut self.drivetrain
    }

    pub fn gamepad_mut(&mut self) -> &mut G {
        &mut self.gamepad
    }

    pub fn drive_mode(&self) -> DriveMode {
        self.drive_ctrl.mode()
    }

    /// The sensor phase fault message last reported, if any.
    pub fn last_fault(&self) -> Option<&str> {
        self.last_fault.as_deref()
    }

    /// Left and right telemetry lines printed while a log button is held.
    ///
    /// The command is the scaled percent output in percent mode and the stick value in velocity
    /// mode.
    pub fn telemetry_lines(&self) -> (String, String) {
        let rpt = &self.ds.drive_ctrl_status_rpt;
        let tm = &self.ds.enc_tm;

        (
            format!(
                "GL:{:.2}  LP:{:.2}  LVips:{:.2}",
                rpt.left_fwd, tm.left_pos_in, tm.left_vel_ips
            ),
            format!(
                "RL:{:.2}  RP:{:.2}  RVips:{:.2}",
                rpt.right_fwd, tm.right_pos_in, tm.right_vel_ips
            ),
        )
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            num_cycles: self.ds.num_cycles,
            duration_s: self.ds.time_s,
            final_mode: self.ds.mode,
            left_pos_in: self.ds.enc_tm.left_pos_in,
            right_pos_in: self.ds.enc_tm.right_pos_in,
            num_hw_errors: self.ds.num_hw_errors,
            safe: self.ds.safe,
        }
    }

    // ---- CALLBACKS ----

    /// Configure the hardware, called once before any mode is entered.
    pub fn robot_init(&mut self) -> Result<(), HalError> {
        self.drivetrain.configure(&self.hardware)?;
        info!("Gamepad on port {}", self.gamepad.port());
        Ok(())
    }

    pub fn disabled_init(&mut self) -> Result<(), HalError> {
        info!("ROBOT DISABLED");
        self.drivetrain.stop()
    }

    pub fn disabled_periodic(&mut self) -> Result<(), HalError> {
        self.drivetrain.stop()?;
        self.ds.enc_tm = self.drivetrain.read_encoders()?;
        Ok(())
    }

    /// Start both encoders at zero and prepare the autonomous routine.
    pub fn autonomous_init(&mut self) -> Result<(), HalError> {
        self.drivetrain.zero_encoders()?;
        self.auto_ctrl.reset();

        // The gamepad isn't used in autonomous
        self.ds.make_unsafe(SafeModeCause::GamepadDisconnected).ok();

        info!("AUTO STARTED");
        Ok(())
    }

    pub fn autonomous_periodic(&mut self) -> Result<(), HalError> {
        self.ds.enc_tm = self.drivetrain.read_encoders()?;

        match self.auto_ctrl.proc(&self.ds.enc_tm) {
            Ok((dems, rpt)) => {
                self.ds.drive_dems = dems;
                self.ds.auto_ctrl_status_rpt = rpt;
            }
            Err(e) => warn!("Error during AutoCtrl processing: {}", e),
        }

        self.actuate()
    }

    /// Start both encoders at zero.
    pub fn teleop_init(&mut self) -> Result<(), HalError> {
        self.drivetrain.zero_encoders()?;
        info!("TELEOP STARTED");
        Ok(())
    }

    pub fn teleop_periodic(&mut self) -> Result<(), HalError> {
        let frame = GamepadFrame::capture(&self.gamepad);

        match self.drive_ctrl.proc(&frame) {
            Ok((dems, rpt)) => {
                self.ds.make_unsafe(SafeModeCause::GamepadDisconnected).ok();
                self.ds.drive_dems = dems;
                self.ds.drive_ctrl_status_rpt = rpt;
            }
            Err(DriveCtrlError::GamepadDisconnected) => {
                if !self.ds.safe_causes.contains(&SafeModeCause::GamepadDisconnected) {
                    error!("Gamepad on port {} disconnected", self.gamepad.port());
                }
                self.ds.make_safe(SafeModeCause::GamepadDisconnected);
            }
            Err(e) => warn!("Error during DriveCtrl processing: {}", e),
        }

        self.actuate()?;

        self.ds.enc_tm = self.drivetrain.read_encoders()?;

        self.check_faults()?;

        if self.ds.drive_ctrl_status_rpt.log_requested {
            let (left, right) = self.telemetry_lines();
            info!("{}", left);
            info!("{}", right);
        }

        Ok(())
    }

    // ---- SCHEDULING ----

    /// Run one cycle in the given mode, entering the mode first if needed.
    ///
    /// Hardware errors put the robot into safe mode until a cycle completes without one.
    pub fn cycle(&mut self, time_s: f64, mode: RobotMode) {
        self.ds.cycle_start(time_s);

        match self.run_mode(mode) {
            Ok(()) => {
                self.ds.make_unsafe(SafeModeCause::HardwareError).ok();
            }
            Err(e) => {
                error!("Hardware error during {:?} cycle: {}", mode, e);
                self.ds.num_hw_errors += 1;
                self.ds.make_safe(SafeModeCause::HardwareError);

                if let Err(e) = self.drivetrain.stop() {
                    error!("Could not stop the drivetrain: {}", e);
                }
            }
        }

        self.ds.num_cycles += 1;
    }

    fn run_mode(&mut self, mode: RobotMode) -> Result<(), HalError> {
        if self.ds.mode != Some(mode) {
            info!("Entering {:?} mode", mode);

            match mode {
                RobotMode::Disabled => self.disabled_init()?,
                RobotMode::Autonomous => self.autonomous_init()?,
                RobotMode::Teleop => self.teleop_init()?,
            }

            self.ds.mode = Some(mode);
        }

        match mode {
            RobotMode::Disabled => self.disabled_periodic(),
            RobotMode::Autonomous => self.autonomous_periodic(),
            RobotMode::Teleop => self.teleop_periodic(),
        }
    }

    /// Send this cycle's demands to the drivetrain, or stop it in safe mode.
    fn actuate(&mut self) -> Result<(), HalError> {
        match self.ds.safe {
            true => self.drivetrain.stop(),
            false => self.drivetrain.dispatch(&self.ds.drive_dems),
        }
    }

    fn check_faults(&mut self) -> Result<(), HalError> {
        let fault = self.drivetrain.check_faults()?;

        if fault != self.last_fault {
            match fault {
                Some(ref log) => warn!("{}", log),
                None => info!("Sensor phase faults cleared"),
            }
            self.last_fault = fault;
        }

        Ok(())
    }

    fn cycle_tm(&self) -> CycleTm {
        CycleTm {
            time_s: self.ds.time_s,
            cycle: self.ds.num_cycles,
            mode: self.ds.mode,
            safe: self.ds.safe,
            drive_mode: self.drive_ctrl.mode(),
            left_demand: self.ds.drive_dems.left.value(),
            right_demand: self.ds.drive_dems.right.value(),
            demand_units: self.ds.drive_dems.left.units(),
            left_pos_in: self.ds.enc_tm.left_pos_in,
            right_pos_in: self.ds.enc_tm.right_pos_in,
            left_vel_ips: self.ds.enc_tm.left_vel_ips,
            right_vel_ips: self.ds.enc_tm.right_vel_ips,
        }
    }
}

impl<M: MotorController + Simulated, G: Gamepad> Robot<M, G> {
    /// Advance the simulated drivetrain.
    pub fn step_sim(&mut self, dt_s: f64) {
        let (left, right) = self.drivetrain.controllers_mut();
        left.step(dt_s);
        right.step(dt_s);
    }
}

impl<M: MotorController, G: Gamepad> Archived for Robot<M, G> {
    fn write(&mut self) -> Result<(), ArchiveError> {
        let tm = self.cycle_tm();

        match self.arch_cycle_tm {
            Some(ref mut a) => a.serialise(tm),
            None => Ok(()),
        }
    }
}
