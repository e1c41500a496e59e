//! Main robot-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Mode selection from the match timeline
//!         - Gamepad input, from a script if one was given
//!         - Robot cycle:
//!             - Mode initialisation on a mode change
//!             - Mode periodic processing
//!         - Simulated hardware step
//!         - Archiving
//!
//! # Modules
//!
//! All control modules (e.g. `drive_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use hal_if::sim::{SimGamepad, SimMotorController};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use bot_lib::{
    auto_ctrl, drive_ctrl,
    mode_sched::TimelineKind,
    params::BotExecParams,
    robot::Robot,
};
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    script_interpreter::{PendingEvents, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "bot_exec", about = "MiniBot executable")]
struct Opt {
    /// Mode to run: match, auto, teleop or disabled
    #[structopt(short, long, default_value = "match")]
    mode: TimelineKind,

    /// Gamepad script to drive the robot with
    #[structopt(short, long, parse(from_os_str))]
    script: Option<PathBuf>,

    /// Drive control parameter file, relative to the params directory
    #[structopt(long, default_value = "drive_ctrl.toml")]
    drive_params: String,

    /// Length of the run in seconds, for the single mode runs
    #[structopt(short, long)]
    duration: Option<f64>,

    /// Run as fast as possible rather than in real time. Single mode runs also need a duration
    /// or a script.
    #[structopt(short, long)]
    fast: bool,

    /// Only write the log to the session directory
    #[structopt(short, long)]
    quiet: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("bot_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, !opt.quiet, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("MiniBot Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let params: BotExecParams = util::params::load("bot_exec.toml")
        .wrap_err("Could not load exec params")?;
    params.are_valid().wrap_err("Exec params are invalid")?;

    let drive_params: drive_ctrl::Params = util::params::load(&opt.drive_params)
        .wrap_err("Could not load DriveCtrl params")?;

    let auto_params: auto_ctrl::Params = util::params::load("auto_ctrl.toml")
        .wrap_err("Could not load AutoCtrl params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE SCRIPT ----

    let mut script = match opt.script {
        Some(ref path) => {
            info!("Loading script from {:?}", path);

            let si = ScriptInterpreter::new(path).wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} events\n",
                si.get_duration(),
                si.get_num_events()
            );

            Some(si)
        }
        None => {
            info!("No script provided, the gamepad will stay centred\n");
            None
        }
    };

    let timeline = opt.mode.timeline(
        opt.duration,
        params.auto_duration_s,
        params.teleop_duration_s,
    );
    info!("Timeline: {:?}", timeline);

    if opt.fast {
        timeline
            .check_fast_run(script.is_some())
            .wrap_err("Invalid run options")?;
    }

    // ---- INITIALISE ROBOT ----

    info!("Initialising robot...");

    let left = SimMotorController::new(params.hardware.left.can_id)
        .with_free_speed(params.sim.free_speed_ticks_per_100ms)
        .with_sensor_reversed(params.sim.left_sensor_reversed);
    let right = SimMotorController::new(params.hardware.right.can_id)
        .with_free_speed(params.sim.free_speed_ticks_per_100ms)
        .with_sensor_reversed(params.sim.right_sensor_reversed);
    let gamepad = SimGamepad::new(params.hardware.gamepad_port);

    let mut robot = Robot::new(left, right, gamepad, &params, drive_params, auto_params)
        .wrap_err("Failed to initialise the robot")?;

    robot
        .enable_archive(&session)
        .wrap_err("Failed to create the cycle archive")?;

    robot
        .robot_init()
        .wrap_err("Failed to configure the robot hardware")?;

    info!("Robot initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        let time_s = robot.data_store().num_cycles as f64 * params.cycle_period_s;

        // ---- GAMEPAD INPUT ----

        if let Some(ref mut si) = script {
            match si.get_pending_events(time_s) {
                PendingEvents::None => (),
                PendingEvents::Some(events) => {
                    for event in events.iter() {
                        robot.gamepad_mut().apply(event);
                    }
                }
                // Only stop for the end of the script if nothing else will
                PendingEvents::EndOfScript if timeline.is_open_ended() => {
                    info!("End of gamepad script reached, stopping");
                    break;
                }
                PendingEvents::EndOfScript => (),
            }
        }

        // ---- ROBOT PROCESSING ----

        let mode = match timeline.mode_at(time_s) {
            Some(m) => m,
            None => {
                info!("End of the run reached at {:.2} s", time_s);
                break;
            }
        };

        robot.cycle(time_s, mode);

        robot.step_sim(params.cycle_period_s);

        // ---- WRITE ARCHIVES ----

        if let Err(e) = robot.write() {
            warn!("Could not write the cycle archive: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        if opt.fast {
            continue;
        }

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(params.cycle_period_s).checked_sub(cycle_dur) {
            Some(d) => {
                robot.data_store_mut().num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                let ds = robot.data_store_mut();
                ds.num_consec_cycle_overruns += 1;
                warn!(
                    "Cycle overran by {:.06} s ({} consecutive)",
                    cycle_dur.as_secs_f64() - params.cycle_period_s,
                    ds.num_consec_cycle_overruns
                );
            }
        }
    }

    // ---- SHUTDOWN ----

    if let Err(e) = robot.drivetrain_mut().stop() {
        warn!("Could not stop the drivetrain: {}", e);
    }

    let summary = robot.summary();
    info!("Run summary: {:#?}", summary);
    session.save("summary.json", summary);

    info!("End of execution");

    session.exit();

    Ok(())
}
