// Domain-driven module structure for the rover mobility controller.

// Core infrastructure
pub mod conf;
pub mod link;

// Domain modules
pub mod fleet;
pub mod flock;
pub mod control;
pub mod runtime;
