//! DVFS governor wiring queues, history, estimation, and actuation.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, RwLock},
};

use tracing::{debug, instrument, warn};

use crate::{
    CompletedJob, DvfsResult, Handle, MonotonicClock, TimeSource,
    config::DvfsConfig,
};

use super::{
    actuators::{FreqActuator, NullActuator},
    estimator::{self, FreqTable, FrequencyPlan},
    history::History,
    queue::JobQueue,
    telemetry::TelemetrySink,
};

/// Everything tracked for one hardware handle.
///
/// The whole record sits behind a single per-handle mutex so that queue
/// mutation, history recording, and sweeping never race, while handles
/// never contend with each other beyond the brief map lookup.
struct HandleState {
    queue: JobQueue,
    history: Option<History>,
    plan: Option<FrequencyPlan>,
    last_submit_us: Option<u64>,
}

/// Governor owning all per-handle estimator state.
///
/// Invoked synchronously from whichever thread delivers submission,
/// dispatch, and completion notifications; every operation is short and
/// non-blocking.
pub struct DvfsGovernor {
    config: DvfsConfig,
    table: FreqTable,
    clock: Arc<dyn TimeSource>,
    telemetry: TelemetrySink,
    actuator: Arc<dyn FreqActuator>,
    handles: RwLock<HashMap<Handle, Arc<Mutex<HandleState>>>>,
}

impl DvfsGovernor {
    pub fn new(telemetry: TelemetrySink, config: DvfsConfig, table: FreqTable) -> DvfsResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            table,
            clock: Arc::new(MonotonicClock::new()),
            telemetry,
            actuator: Arc::new(NullActuator),
            handles: RwLock::new(HashMap::new()),
        })
    }

    pub fn with_time_source<T: TimeSource + 'static>(mut self, clock: T) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_actuator<A: FreqActuator + 'static>(mut self, actuator: A) -> Self {
        self.actuator = Arc::new(actuator);
        self
    }

    pub fn config(&self) -> &DvfsConfig {
        &self.config
    }

    pub fn table(&self) -> &FreqTable {
        &self.table
    }

    pub fn telemetry(&self) -> TelemetrySink {
        self.telemetry.clone()
    }

    /// Appends a new job at the tail of the handle's queue.
    #[instrument(skip(self), fields(handle = %handle))]
    pub fn submit_job(&self, handle: Handle) -> DvfsResult<()> {
        let now = self.clock.now_us();
        let state = self.state_for(handle);
        let mut state = lock(&state);
        let interval_us = state
            .last_submit_us
            .map(|prev| now.saturating_sub(prev))
            .unwrap_or(0);
        let estimate_mhz = state
            .plan
            .map(|plan| plan.active_mhz())
            .unwrap_or((self.config.default_freq_hz / 1_000_000) as u32);
        state.queue.submit(now, interval_us, estimate_mhz)?;
        state.last_submit_us = Some(now);
        self.telemetry.record_submitted();
        Ok(())
    }

    /// Promotes the handle's next waiting job to the queue head.
    ///
    /// Returns false when there is nothing to promote; callers treat that
    /// as informational, not as a failure.
    #[instrument(skip(self), fields(handle = %handle))]
    pub fn dispatch_job(&self, handle: Handle) -> bool {
        let now = self.clock.now_us();
        let state = self.state_for(handle);
        let mut state = lock(&state);
        let promoted = state.queue.promote(now);
        if promoted {
            self.telemetry.record_dispatched();
        } else {
            debug!(%handle, "no waiting job to promote");
        }
        promoted
    }

    /// Retires the handle's current job and folds it into history.
    #[instrument(skip(self), fields(handle = %handle))]
    pub fn complete_job(&self, handle: Handle, cycles: u64, end_us: u64) -> DvfsResult<CompletedJob> {
        let state = self.state_for(handle);
        let mut state = lock(&state);
        let completed = match state.queue.complete(cycles, end_us) {
            Ok(completed) => completed,
            Err(err) => {
                self.telemetry.record_stray_completion();
                warn!(%handle, "completion without matching submission");
                return Err(err);
            }
        };
        let depth = self.config.history_depth;
        state
            .history
            .get_or_insert_with(|| History::new(depth))
            .record(&completed, completed.submit_interval_us);
        self.telemetry.record_completed();
        Ok(completed)
    }

    /// Computes and records the frequency plan for the handle's next job.
    ///
    /// Never fails: with no usable history the configured default is
    /// planned, and above-table targets clamp to the maximum rate.
    #[instrument(skip(self), fields(handle = %handle))]
    pub fn estimate_frequency(&self, handle: Handle) -> u64 {
        let state = self.state_for(handle);
        let mut state = lock(&state);
        let target_hz =
            estimator::estimate(&self.config, state.queue.len(), state.history.as_ref());
        let plan = FrequencyPlan {
            target_hz,
            active_hz: self.table.match_rate(target_hz),
        };
        state.plan = Some(plan);
        self.telemetry.record_estimate();
        plan.active_hz
    }

    /// Last plan recorded for the handle, if any.
    pub fn frequency_plan(&self, handle: Handle) -> Option<FrequencyPlan> {
        let map = read_map(&self.handles);
        let state = map.get(&handle)?.clone();
        drop(map);
        lock(&state).plan
    }

    /// Plan for codec modules sharing one clock domain: the domain must
    /// run fast enough for its most demanding handle.
    pub fn domain_plan(&self) -> FrequencyPlan {
        let states: Vec<_> = read_map(&self.handles).values().cloned().collect();
        let target_hz = states
            .iter()
            .filter_map(|state| lock(state).plan.map(|plan| plan.target_hz))
            .max()
            .unwrap_or(self.config.default_freq_hz);
        FrequencyPlan {
            target_hz,
            active_hz: self.table.match_rate(target_hz),
        }
    }

    /// Estimates the handle's frequency and pushes the plan through the
    /// configured actuator.
    pub async fn update_frequency(&self, handle: Handle) -> DvfsResult<u64> {
        let active_hz = self.estimate_frequency(handle);
        if let Some(plan) = self.frequency_plan(handle) {
            self.actuator.apply(handle, &plan).await?;
        }
        Ok(active_hz)
    }

    /// In-flight job count for the handle.
    pub fn queued_jobs(&self, handle: Handle) -> usize {
        let map = read_map(&self.handles);
        map.get(&handle)
            .map(|state| lock(state).queue.len())
            .unwrap_or(0)
    }

    /// Explicit teardown when a handle's hardware context is destroyed.
    /// Safe to call for a handle that was never seen.
    pub fn release_handle(&self, handle: Handle) {
        let mut map = write_map(&self.handles);
        map.remove(&handle);
    }

    /// Drops history for idle handles, or for every handle when
    /// `only_unused` is false. Returns the number of histories removed.
    pub fn sweep(&self, only_unused: bool) -> usize {
        let mut removed = 0;
        let mut idle = Vec::new();
        {
            let map = read_map(&self.handles);
            for (handle, state) in map.iter() {
                let mut state = lock(state);
                if only_unused && !state.queue.is_empty() {
                    continue;
                }
                if state.history.take().is_some() {
                    removed += 1;
                }
                if state.queue.is_empty() {
                    idle.push(*handle);
                }
            }
        }
        if !idle.is_empty() {
            // Reclaim idle map entries, re-checking under the write lock
            // in case a submission raced the scan above.
            let mut map = write_map(&self.handles);
            for handle in idle {
                let empty = map
                    .get(&handle)
                    .map(|state| {
                        let state = lock(state);
                        state.queue.is_empty() && state.history.is_none()
                    })
                    .unwrap_or(false);
                if empty {
                    map.remove(&handle);
                }
            }
        }
        if removed > 0 {
            debug!(removed, only_unused, "swept histories");
        }
        self.telemetry.record_swept(removed);
        removed
    }

    /// Periodic reclamation entry point: drops history only for handles
    /// with no in-flight work.
    pub fn sweep_unused(&self) -> usize {
        self.sweep(true)
    }

    fn state_for(&self, handle: Handle) -> Arc<Mutex<HandleState>> {
        if let Some(state) = read_map(&self.handles).get(&handle) {
            return state.clone();
        }
        let mut map = write_map(&self.handles);
        map.entry(handle)
            .or_insert_with(|| {
                Arc::new(Mutex::new(HandleState {
                    queue: JobQueue::new(handle, self.config.max_queued_jobs),
                    history: None,
                    plan: None,
                    last_submit_us: None,
                }))
            })
            .clone()
    }
}

fn lock(state: &Arc<Mutex<HandleState>>) -> std::sync::MutexGuard<'_, HandleState> {
    state.lock().expect("handle state mutex poisoned")
}

fn read_map(
    map: &RwLock<HashMap<Handle, Arc<Mutex<HandleState>>>>,
) -> std::sync::RwLockReadGuard<'_, HashMap<Handle, Arc<Mutex<HandleState>>>> {
    map.read().expect("handle map lock poisoned")
}

fn write_map(
    map: &RwLock<HashMap<Handle, Arc<Mutex<HandleState>>>>,
) -> std::sync::RwLockWriteGuard<'_, HashMap<Handle, Arc<Mutex<HandleState>>>> {
    map.write().expect("handle map lock poisoned")
}
