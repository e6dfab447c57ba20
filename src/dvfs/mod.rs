//! Codec DVFS estimator components.

pub mod actuators;
pub mod estimator;
pub mod governor;
pub mod history;
pub mod queue;
pub mod sweeper;
pub mod telemetry;
