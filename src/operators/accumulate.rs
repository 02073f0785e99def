// Copyright (c) 2025 - Cowboy AI, Inc.
//! accumulate - running fold that emits every intermediate result
//!
//! Like a fold over the stream, except each intermediate accumulator value
//! is republished as it is produced (the stream analogue of `scan` on
//! iterators). The accumulator is seeded once at construction; completion
//! is forwarded unchanged.

use std::sync::Mutex;

use crate::event::Event;
use crate::stream::EventStream;

impl<Value: Clone + Send + Sync + 'static> EventStream<Value> {
    /// Fold values into a running accumulator, publishing each step
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// // 1, 2, 3 -> 1, 3, 6
    /// let running_sum = numbers.accumulate(0, |sum, n| sum + n);
    /// ```
    pub fn accumulate<Result, Accumulator>(
        &self,
        initial_value: Result,
        accumulator: Accumulator,
    ) -> EventStream<Result>
    where
        Result: Clone + Send + Sync + 'static,
        Accumulator: Fn(Result, Value) -> Result + Send + Sync + 'static,
    {
        let source = self.clone();
        EventStream::new(
            move |input| {
                let last = Mutex::new(initial_value);
                let completion_input = input.clone();
                source.subscribe_events_with_completion(
                    move |event| {
                        // Never publish while holding the accumulator lock
                        let current = {
                            let mut last = last.lock().expect("accumulator state poisoned");
                            *last = accumulator(last.clone(), event.value);
                            last.clone()
                        };
                        input.publish(Event::at(current, event.time));
                    },
                    move || completion_input.complete(),
                )
            },
            drop,
        )
    }
}
