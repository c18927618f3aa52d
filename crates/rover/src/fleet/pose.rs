//! Pose — planar pose types and heading arithmetic.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

/// 2D pose in the world frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// X position in meters
    pub x: f64,
    /// Y position in meters
    pub y: f64,
    /// Heading in radians, wrapped to (-π, π]
    pub theta: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta: wrap_angle(theta) }
    }

    /// Unit vector pointing along the heading.
    pub fn heading_unit(&self) -> (f64, f64) {
        (self.theta.cos(), self.theta.sin())
    }

    pub fn distance_to(&self, other: &Pose) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Latest known pose of one fleet member.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentPose {
    pub identity: String,
    pub pose: Pose,
}

/// Wrap an angle into (-π, π].
pub fn wrap_angle(angle: f64) -> f64 {
    if !angle.is_finite() || (angle > -PI && angle <= PI) {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

/// Signed rotation that takes `current` onto `target` the short way round.
pub fn shortest_angular_difference(target: f64, current: f64) -> f64 {
    wrap_angle(target - current)
}
