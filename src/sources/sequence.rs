// Copyright (c) 2025 - Cowboy AI, Inc.
//! Sequence and timer sources
//!
//! Build a stream from a sequence of time-tagged elements: the scheduler
//! fires once per element at its extracted fire time and the stream
//! publishes the extracted value. The stream's only state is the
//! scheduler's [`TimerHandle`](crate::scheduler::TimerHandle), released on
//! stream teardown, which stops any remaining firings.
//!
//! The stream completes when the scheduler reports the schedule exhausted.

use std::sync::Arc;

use crate::event::Timestamp;
use crate::scheduler::{Scheduler, TimerEntry};
use crate::stream::EventStream;

impl<Value: Clone + Send + Sync + 'static> EventStream<Value> {
    /// Publish `get_value(element)` at `get_time(element)` for each element
    ///
    /// Elements fire in ascending fire-time order; elements with identical
    /// fire times fire in input order (required of the scheduler).
    pub fn sequence<Element, Values, GetValue, GetTime>(
        values: Values,
        get_value: GetValue,
        get_time: GetTime,
        scheduler: &dyn Scheduler,
    ) -> Self
    where
        Element: Send + 'static,
        Values: IntoIterator<Item = Element>,
        GetValue: Fn(Element) -> Value + Send + Sync + 'static,
        GetTime: Fn(&Element) -> Timestamp,
    {
        EventStream::new(
            move |input| {
                let get_value = Arc::new(get_value);
                let entries: Vec<TimerEntry> = values
                    .into_iter()
                    .map(|element| {
                        let fire_at = get_time(&element);
                        let fire_input = input.clone();
                        let get_value = get_value.clone();
                        TimerEntry::new(fire_at, move || {
                            fire_input.publish_value(get_value(element));
                        })
                    })
                    .collect();

                let completion_input = input.clone();
                scheduler.run_timer(entries, Box::new(move || completion_input.complete()))
            },
            |timer| timer.release(),
        )
    }

    /// Sequence over `(value, fire_time)` pairs
    pub fn sequence_pairs<Values>(values: Values, scheduler: &dyn Scheduler) -> Self
    where
        Values: IntoIterator<Item = (Value, Timestamp)>,
    {
        Self::sequence(values, |(value, _)| value, |(_, time)| *time, scheduler)
    }
}

impl EventStream<()> {
    /// Fire a unit value at each of the given times
    pub fn timer<FireTimes>(times: FireTimes, scheduler: &dyn Scheduler) -> Self
    where
        FireTimes: IntoIterator<Item = Timestamp>,
    {
        Self::sequence(times, |_| (), |time| *time, scheduler)
    }
}
