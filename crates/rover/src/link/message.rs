//! Message — the envelope exchanged with the transport.

use serde::{Deserialize, Serialize};

/// One datagram on the link.
///
/// `Pose` and `Announce` are fleet-wide; every other variant names the rover
/// it is addressed to or published by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Pose broadcast in the `"<identity> (<x>,<y>,<theta>)"` text format.
    Pose { text: String },
    Announce { text: String },
    Mode { rover: String, mode: u8 },
    Joystick { rover: String, linear: f64, angular: f64 },
    Odometry { rover: String, x: f64, y: f64, theta: f64 },
    Velocity { rover: String, linear: f64, angular: f64 },
    Status { rover: String, text: String },
    StateMachine { rover: String, text: String },
    Diagnostic { rover: String, text: String },
}

impl Message {
    /// Rover this message is addressed to, `None` for fleet-wide messages.
    pub fn rover(&self) -> Option<&str> {
        match self {
            Message::Pose { .. } | Message::Announce { .. } => None,
            Message::Mode { rover, .. }
            | Message::Joystick { rover, .. }
            | Message::Odometry { rover, .. }
            | Message::Velocity { rover, .. }
            | Message::Status { rover, .. }
            | Message::StateMachine { rover, .. }
            | Message::Diagnostic { rover, .. } => Some(rover),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Message::Pose { .. } => "pose",
            Message::Announce { .. } => "announce",
            Message::Mode { .. } => "mode",
            Message::Joystick { .. } => "joystick",
            Message::Odometry { .. } => "odometry",
            Message::Velocity { .. } => "velocity",
            Message::Status { .. } => "status",
            Message::StateMachine { .. } => "state_machine",
            Message::Diagnostic { .. } => "diagnostic",
        }
    }
}
