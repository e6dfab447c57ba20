//! Rolling per-handle record of recently completed jobs.

use crate::CompletedJob;

/// Statistics captured from one completed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySample {
    pub cycles: u64,
    pub submit_us: u64,
    pub start_us: u64,
    pub end_us: u64,
    pub sw_time_us: u64,
}

/// Fixed-capacity ring of completion samples with rolling aggregates.
///
/// Cycle and wall-time totals are maintained incrementally: recording a
/// sample over a full ring subtracts the overwritten entry before adding
/// the new one, so the totals always equal the sum over the currently
/// valid window without a rescan.
#[derive(Debug, Clone)]
pub struct History {
    samples: Vec<HistorySample>,
    depth: usize,
    write_index: usize,
    total_cycles: u64,
    total_time_us: u64,
    interval_est_us: u64,
    last_activity_us: u64,
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self {
            samples: Vec::with_capacity(depth),
            depth,
            write_index: 0,
            total_cycles: 0,
            total_time_us: 0,
            interval_est_us: 0,
            last_activity_us: 0,
        }
    }

    /// Writes the next ring sample and folds the measured submit interval
    /// into the rolling estimate.
    pub fn record(&mut self, job: &CompletedJob, interval_us: u64) {
        let sample = HistorySample {
            cycles: job.cycles,
            submit_us: job.submit_us,
            start_us: job.start_us,
            end_us: job.end_us,
            sw_time_us: job.sw_time_us,
        };
        let time_us = job.end_us.saturating_sub(job.start_us);

        if self.samples.len() < self.depth {
            self.samples.push(sample);
        } else {
            let old = self.samples[self.write_index];
            self.total_cycles = self.total_cycles.saturating_sub(old.cycles);
            self.total_time_us = self
                .total_time_us
                .saturating_sub(old.end_us.saturating_sub(old.start_us));
            self.samples[self.write_index] = sample;
        }
        self.write_index = (self.write_index + 1) % self.depth;
        self.total_cycles += job.cycles;
        self.total_time_us += time_us;

        if interval_us > 0 {
            self.interval_est_us = if self.interval_est_us == 0 {
                interval_us
            } else {
                // EWMA weighted 3:1 toward the existing estimate.
                (self.interval_est_us * 3 + interval_us) / 4
            };
        }
        self.last_activity_us = job.end_us;
    }

    /// Number of valid samples currently retained.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[HistorySample] {
        &self.samples
    }

    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    pub fn total_time_us(&self) -> u64 {
        self.total_time_us
    }

    /// Average hardware cycles per completed job over the window.
    pub fn avg_cycles(&self) -> u64 {
        if self.samples.is_empty() {
            0
        } else {
            self.total_cycles / self.samples.len() as u64
        }
    }

    /// Average wall time per completed job over the window, microseconds.
    pub fn avg_time_us(&self) -> u64 {
        if self.samples.is_empty() {
            0
        } else {
            self.total_time_us / self.samples.len() as u64
        }
    }

    /// Smoothed interval between consecutive submissions, microseconds.
    /// Zero until at least one interval has been observed.
    pub fn submit_interval_us(&self) -> u64 {
        self.interval_est_us
    }

    pub fn last_activity_us(&self) -> u64 {
        self.last_activity_us
    }
}
