//! Conf module — configuration model and loading.

pub mod model;
pub mod load;

pub use model::{RoverConfig, FlockingConfig, ControlConfig, LinkConfig};
pub use load::{host_identity, validate_identity};
