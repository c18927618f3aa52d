//! Velocity — the command handed to the actuation interface.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityCommand {
    /// Forward speed; never negative for autonomous commands.
    pub linear: f64,
    /// Signed turn rate, counter-clockwise positive.
    pub angular: f64,
}

impl VelocityCommand {
    pub fn new(linear: f64, angular: f64) -> Self {
        Self { linear, angular }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Apply the actuation-boundary gains.
    pub fn scaled(self, linear_scale: f64, angular_scale: f64) -> Self {
        Self {
            linear: self.linear * linear_scale,
            angular: self.angular * angular_scale,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.linear == 0.0 && self.angular == 0.0
    }
}
