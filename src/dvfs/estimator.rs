//! Frequency estimation and supported-rate matching.

use tracing::trace;

use crate::{DvfsError, DvfsResult, config::DvfsConfig};

use super::history::History;

/// Ascending table of hardware-supported clock rates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreqTable {
    rates_hz: Vec<u64>,
}

impl FreqTable {
    /// Builds a table from platform-provided rates, normalising order and
    /// duplicates. At least one positive rate is required.
    pub fn new(mut rates_hz: Vec<u64>) -> DvfsResult<Self> {
        rates_hz.retain(|&rate| rate > 0);
        rates_hz.sort_unstable();
        rates_hz.dedup();
        if rates_hz.is_empty() {
            return Err(DvfsError::Table("no supported rates".to_string()));
        }
        Ok(Self { rates_hz })
    }

    pub fn rates_hz(&self) -> &[u64] {
        &self.rates_hz
    }

    pub fn max_rate(&self) -> u64 {
        self.rates_hz[self.rates_hz.len() - 1]
    }

    /// Returns the smallest supported rate that still covers `target_hz`,
    /// or the maximum rate when the target exceeds every entry. Matching
    /// always produces a usable value; it never rounds down below the
    /// requirement.
    pub fn match_rate(&self, target_hz: u64) -> u64 {
        for &rate in &self.rates_hz {
            if rate >= target_hz {
                return rate;
            }
        }
        self.max_rate()
    }
}

/// Raw estimate paired with the table entry selected for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyPlan {
    pub target_hz: u64,
    pub active_hz: u64,
}

impl FrequencyPlan {
    pub fn active_mhz(&self) -> u32 {
        (self.active_hz / 1_000_000) as u32
    }
}

/// Computes the raw required frequency for the next job of a handle.
///
/// Cold start (no history) returns the configured default so the first
/// job is never underestimated. Otherwise the target is throughput
/// proportional: average cycles per job times the queued-job count,
/// divided by the time budget until the next expected submission. A
/// drained queue still budgets for one upcoming job.
pub fn estimate(config: &DvfsConfig, queued: usize, history: Option<&History>) -> u64 {
    let Some(history) = history.filter(|h| !h.is_empty()) else {
        return config.default_freq_hz;
    };

    let avg_cycles = history.avg_cycles();
    let avg_time_us = history.avg_time_us();
    let interval_us = history.submit_interval_us();
    let jobs = queued.max(1) as u64;

    let mut budget_us = if interval_us > 0 {
        interval_us
    } else {
        avg_time_us
    };
    if interval_us > 0 && interval_us < config.min_submit_gap_us {
        // Bursty: plan back-to-back jobs at the full observed service
        // rate instead of stretching them across the submit gap.
        budget_us = budget_us.min(avg_time_us);
    }
    budget_us = budget_us.max(1);

    let mut target_hz = avg_cycles
        .saturating_mul(jobs)
        .saturating_mul(1_000_000)
        / budget_us;
    if interval_us > config.max_submit_gap_us {
        // Idle: no point holding a high clock for sporadic work.
        target_hz = target_hz.min(config.default_freq_hz);
    }
    trace!(
        avg_cycles,
        avg_time_us, interval_us, queued, target_hz, "estimated required frequency"
    );
    target_hz
}
