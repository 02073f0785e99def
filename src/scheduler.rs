// Copyright (c) 2025 - Cowboy AI, Inc.
//! Scheduler - the external timing collaborator
//!
//! The sequence/timer sources do not keep time themselves; they hand a
//! schedule of pre-bound firing closures to a [`Scheduler`] and hold only
//! the returned [`TimerHandle`]. Releasing the handle (explicitly or by
//! drop) stops all future firings.
//!
//! # Contract
//!
//! A scheduler must fire entries in ascending `fire_at` order, with
//! entries sharing a fire time fired in the order they were supplied, and
//! must invoke `on_complete` exactly once after the last firing. Firings
//! run on a scheduler-chosen execution context; the stream machinery is
//! safe to drive from there, but per-subscriber ordering across *several*
//! concurrently-running timers is up to the caller.
//!
//! [`TokioScheduler`] is the production implementation; tests drive the
//! same trait with a manual scheduler that fires on demand.

use std::time::Duration as StdDuration;

use chrono::Utc;
use tracing::debug;

use crate::event::Timestamp;

/// One scheduled firing: a fire time and the action bound to it
pub struct TimerEntry {
    /// When this entry should fire
    pub fire_at: Timestamp,
    fire: Box<dyn FnOnce() + Send>,
}

impl TimerEntry {
    /// Bind `fire` to run at `fire_at`
    pub fn new(fire_at: Timestamp, fire: impl FnOnce() + Send + 'static) -> Self {
        Self {
            fire_at,
            fire: Box::new(fire),
        }
    }

    /// Run the bound action, consuming the entry
    pub fn fire(self) {
        (self.fire)();
    }
}

/// Stops future firings when released; releasable exactly once
pub struct TimerHandle {
    stop: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    /// Create a handle that runs `stop` on release or drop
    pub fn new(stop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            stop: Some(Box::new(stop)),
        }
    }

    /// Stop future firings now instead of waiting for drop
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            debug!("timer released");
            stop();
        }
    }
}

/// Runs a schedule of timed firings against some execution context
pub trait Scheduler: Send + Sync {
    /// Fire every entry at its fire time, then call `on_complete`
    ///
    /// Entries must fire in ascending `fire_at` order; identical fire
    /// times fire in supply order. The returned handle stops all future
    /// firings on release.
    fn run_timer(
        &self,
        entries: Vec<TimerEntry>,
        on_complete: Box<dyn FnOnce() + Send>,
    ) -> TimerHandle;
}

/// Scheduler backed by the ambient tokio runtime
///
/// Spawns one task per timer that sleeps to each fire time in turn. Fire
/// times already in the past fire immediately, in order. Releasing the
/// handle aborts the task.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioScheduler;

impl TokioScheduler {
    /// Create a scheduler; `run_timer` must be called with a runtime ambient
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for TokioScheduler {
    fn run_timer(
        &self,
        mut entries: Vec<TimerEntry>,
        on_complete: Box<dyn FnOnce() + Send>,
    ) -> TimerHandle {
        // Stable sort: entries with equal fire times keep supply order
        entries.sort_by_key(|entry| entry.fire_at);

        debug!(entries = entries.len(), "timer started");

        let task = tokio::spawn(async move {
            for entry in entries {
                let delay = (entry.fire_at - Utc::now())
                    .to_std()
                    .unwrap_or(StdDuration::ZERO);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                entry.fire();
            }
            on_complete();
        });

        TimerHandle::new(move || task.abort())
    }
}
