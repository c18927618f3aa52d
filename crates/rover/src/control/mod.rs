//! Control module — mode state machine, velocity commands, kill-switch.

pub mod velocity;
pub mod mode;
pub mod watchdog;
pub mod controller;

pub use controller::Controller;
pub use mode::{ControllerState, Maneuver, ModeSignal};
pub use velocity::VelocityCommand;
pub use watchdog::Watchdog;
