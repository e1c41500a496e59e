//! Control module interface
//!
//! `DriveCtrl` and `AutoCtrl` both implement [`State`], so the robot drives them the same way:
//! `init` once with the module's parameters, then `proc` every cycle with that cycle's sensor or
//! gamepad data.

/// A control module stepped once per cycle.
pub trait State {
    /// Usually the module's parameters, loaded from its TOML file.
    type InitData;
    type InitError;

    /// Sampled once per cycle, for example a gamepad frame or encoder telemetry.
    type InputData;
    /// Demands for the drivetrain.
    type OutputData;
    /// Monitoring information archived and logged by the executable.
    type StatusReport;
    type ProcError;

    /// Validate `init_data` and prepare the module for processing.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError>;

    /// Run one cycle, producing the demands and a status report.
    ///
    /// Modules must return an error rather than demands if they have not been initialised.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
