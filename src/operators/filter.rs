// Copyright (c) 2025 - Cowboy AI, Inc.
//! filter - keep only values matching a predicate
//!
//! The predicate sees both the value and its timestamp; admitted events
//! pass through untouched. Completion is forwarded unchanged.

use crate::event::Timestamp;
use crate::stream::EventStream;

impl<Value: Clone + Send + Sync + 'static> EventStream<Value> {
    /// Keep events for which `predicate(value, time)` holds
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let evens = numbers.filter(|n, _time| n % 2 == 0);
    /// ```
    pub fn filter<Predicate>(&self, predicate: Predicate) -> EventStream<Value>
    where
        Predicate: Fn(&Value, Timestamp) -> bool + Send + Sync + 'static,
    {
        let source = self.clone();
        EventStream::new(
            move |input| {
                let completion_input = input.clone();
                source.subscribe_events_with_completion(
                    move |event| {
                        if predicate(&event.value, event.time) {
                            input.publish(event);
                        }
                    },
                    move || completion_input.complete(),
                )
            },
            drop,
        )
    }
}
