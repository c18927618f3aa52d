//! Flock module — neighbor graph and flocking force blend.
//!
//! Everything here is a pure function of the pose registry, so the same
//! routine serves whichever slot this rover occupies.

pub mod neighbors;
pub mod blend;

pub use neighbors::{neighbors_of, Neighbor};
pub use blend::{blend, global_average_heading, Blend, FlockingWeights};
