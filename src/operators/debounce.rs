// Copyright (c) 2025 - Cowboy AI, Inc.
//! debounce - drop values arriving within a tolerance window
//!
//! A stateful filter over event timestamps: a value is admitted iff at
//! least `tolerance` has elapsed since the last *admitted* value, and the
//! watermark advances only on admission. The watermark starts at the epoch
//! so the first value is always admitted (for any reasonable tolerance).

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::stream::EventStream;

impl<Value: Clone + Send + Sync + 'static> EventStream<Value> {
    /// Admit a value only when `tolerance` has passed since the last admitted one
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let calm = bursts.debounce(Duration::milliseconds(250));
    /// ```
    pub fn debounce(&self, tolerance: Duration) -> EventStream<Value> {
        let last_admitted = Mutex::new(DateTime::<Utc>::UNIX_EPOCH);
        self.filter(move |_, time| {
            let mut last = last_admitted.lock().expect("debounce watermark poisoned");
            if time - *last >= tolerance {
                *last = time;
                true
            } else {
                false
            }
        })
    }
}
