//! Per-handle queue of in-flight codec jobs.

use std::collections::VecDeque;

use crate::{CompletedJob, DvfsError, DvfsResult, Handle};

/// One submitted-but-not-yet-retired unit of hardware work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub handle: Handle,
    pub submit_us: u64,
    /// Set when the job is promoted to the head at dispatch.
    pub start_us: Option<u64>,
    pub end_us: Option<u64>,
    pub cycles: u64,
    /// Interval since the previous submission for the same handle.
    pub interval_us: u64,
    /// Frequency plan in MHz that was active at submission.
    pub estimate_mhz: u32,
}

/// Ordered collection of in-flight jobs for a single handle.
///
/// The head is the current (dispatched) job; the remainder reflects
/// submission order. Queues for different handles are fully independent
/// structures and never share state.
#[derive(Debug)]
pub struct JobQueue {
    handle: Handle,
    jobs: VecDeque<Job>,
    capacity: usize,
}

impl JobQueue {
    pub fn new(handle: Handle, capacity: usize) -> Self {
        Self {
            handle,
            jobs: VecDeque::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Appends a new job at the tail.
    ///
    /// The capacity bound is the allocation limit for queue storage; an
    /// overflowing submission is reported, never silently dropped.
    pub fn submit(&mut self, submit_us: u64, interval_us: u64, estimate_mhz: u32) -> DvfsResult<()> {
        if self.jobs.len() >= self.capacity {
            return Err(DvfsError::QueueFull(self.handle));
        }
        self.jobs.push_back(Job {
            handle: self.handle,
            submit_us,
            start_us: None,
            end_us: None,
            cycles: 0,
            interval_us,
            estimate_mhz,
        });
        Ok(())
    }

    /// Promotes the oldest not-yet-dispatched job to the head and stamps
    /// its start time. Returns false when nothing is waiting for
    /// dispatch; the caller may already have promoted, or the job may
    /// have completed, so this is not an error.
    pub fn promote(&mut self, start_us: u64) -> bool {
        let Some(index) = self.jobs.iter().position(|job| job.start_us.is_none()) else {
            return false;
        };
        match self.jobs.remove(index) {
            Some(mut job) => {
                job.start_us = Some(start_us);
                self.jobs.push_front(job);
                true
            }
            None => false,
        }
    }

    /// Removes the head job and produces its completion record.
    ///
    /// A completion with no queued job indicates a notification for work
    /// that was never submitted, which is a protocol bug upstream.
    pub fn complete(&mut self, cycles: u64, end_us: u64) -> DvfsResult<CompletedJob> {
        let Some(job) = self.jobs.pop_front() else {
            return Err(DvfsError::StrayCompletion(self.handle));
        };
        let start_us = job.start_us.unwrap_or(job.submit_us);
        Ok(CompletedJob {
            handle: job.handle,
            submit_us: job.submit_us,
            start_us,
            end_us,
            cycles,
            sw_time_us: start_us.saturating_sub(job.submit_us),
            submit_interval_us: job.interval_us,
            estimate_mhz: job.estimate_mhz,
        })
    }
}
