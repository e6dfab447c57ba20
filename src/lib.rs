//! Core library for the vpufreq DVFS estimator.
//!
//! The crate tracks recent hardware codec job execution history per handle
//! and estimates the minimum clock frequency that still meets the next
//! job's deadline. It is a pure decision component: the host driver feeds
//! it submissions, dispatches, and completions, and reads back a frequency
//! matched against the hardware's supported-rate table. Applying that
//! frequency to the clock hardware stays with the caller.

pub mod config;
pub mod dvfs;

use std::{fmt::Display, time::Instant};

use thiserror::Error;

/// Opaque identifier for one hardware codec instance/context.
///
/// The estimator only ever compares handles for equality; the value
/// carries no meaning beyond identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u64);

impl Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "handle#{}", self.0)
    }
}

/// Completion record handed from the job queue to the history store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedJob {
    pub handle: Handle,
    /// Submission timestamp in microseconds.
    pub submit_us: u64,
    /// Dispatch timestamp; equals `submit_us` when the job was never
    /// explicitly dispatched before completing.
    pub start_us: u64,
    /// Completion timestamp in microseconds.
    pub end_us: u64,
    /// Hardware cycles the job consumed.
    pub cycles: u64,
    /// Software overhead between submission and dispatch, microseconds.
    pub sw_time_us: u64,
    /// Interval between this submission and the previous one for the
    /// same handle, microseconds; zero for the first submission.
    pub submit_interval_us: u64,
    /// Frequency plan in MHz that was active when the job was submitted.
    pub estimate_mhz: u32,
}

/// Errors surfaced by the estimator core.
///
/// Only structural problems become errors; missing history and
/// above-table targets degrade to safe values instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DvfsError {
    #[error("job queue for {0} is full")]
    QueueFull(Handle),
    #[error("completion without matching submission for {0}")]
    StrayCompletion(Handle),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid frequency table: {0}")]
    Table(String),
    #[error("actuator failure: {0}")]
    Actuator(String),
}

/// Result alias for estimator operations.
pub type DvfsResult<T> = Result<T, DvfsError>;

/// Monotonic elapsed-time source in microseconds.
///
/// The core never reads wall-clock time; the only requirement is that
/// consecutive calls never go backwards.
pub trait TimeSource: Send + Sync {
    fn now_us(&self) -> u64;
}

/// Production time source backed by `Instant`.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}
