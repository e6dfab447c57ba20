//! Telemetry collection primitives for DVFS decisions.

use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct TelemetryState {
    submitted: u64,
    dispatched: u64,
    completed: u64,
    stray_completions: u64,
    estimates: u64,
    histories_swept: u64,
}

/// Snapshot of telemetry suitable for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub submitted: u64,
    pub dispatched: u64,
    pub completed: u64,
    pub stray_completions: u64,
    pub estimates: u64,
    pub histories_swept: u64,
}

/// Shared sink counting estimator events.
#[derive(Clone, Default)]
pub struct TelemetrySink {
    state: Arc<Mutex<TelemetryState>>,
}

impl TelemetrySink {
    pub fn record_submitted(&self) {
        self.lock().submitted += 1;
    }

    pub fn record_dispatched(&self) {
        self.lock().dispatched += 1;
    }

    pub fn record_completed(&self) {
        self.lock().completed += 1;
    }

    pub fn record_stray_completion(&self) {
        self.lock().stray_completions += 1;
    }

    pub fn record_estimate(&self) {
        self.lock().estimates += 1;
    }

    pub fn record_swept(&self, removed: usize) {
        self.lock().histories_swept += removed as u64;
    }

    /// Exposes a snapshot for diagnostics and testing.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        let state = self.lock();
        TelemetrySnapshot {
            submitted: state.submitted,
            dispatched: state.dispatched,
            completed: state.completed,
            stray_completions: state.stray_completions,
            estimates: state.estimates,
            histories_swept: state.histories_swept,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TelemetryState> {
        self.state.lock().expect("telemetry mutex poisoned")
    }
}
