//! Fleet module — peer poses, the fixed-roster registry, and the pose wire codec.

pub mod pose;
pub mod registry;
pub mod codec;

pub use pose::{AgentPose, Pose, wrap_angle, shortest_angular_difference};
pub use registry::PoseRegistry;

use thiserror::Error;

/// Standard Result type for the fleet module
pub type Result<T> = std::result::Result<T, FleetError>;

#[derive(Debug, Error, PartialEq)]
pub enum FleetError {
    /// More distinct identities were observed than the configured fleet size.
    #[error("Roster full: cannot register '{identity}', all {capacity} slots are taken")]
    RosterFull { identity: String, capacity: usize },

    #[error("Malformed pose message: {0}")]
    MalformedMessage(String),
}
