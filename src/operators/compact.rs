// Copyright (c) 2025 - Cowboy AI, Inc.
//! compact / compact_map - drop absent values
//!
//! `compact` turns a stream of `Option<Value>` into a stream of `Value`,
//! dropping `None` and unwrapping `Some` while keeping the original event
//! time. `compact_map` is nothing more than `map` followed by `compact`.

use crate::event::Event;
use crate::stream::EventStream;

impl<Value: Clone + Send + Sync + 'static> EventStream<Option<Value>> {
    /// Drop `None` events and unwrap the rest
    pub fn compact(&self) -> EventStream<Value> {
        let source = self.clone();
        EventStream::new(
            move |input| {
                let completion_input = input.clone();
                source.subscribe_events_with_completion(
                    move |event| {
                        if let Some(value) = event.value {
                            input.publish(Event::at(value, event.time));
                        }
                    },
                    move || completion_input.complete(),
                )
            },
            drop,
        )
    }
}

impl<Value: Clone + Send + Sync + 'static> EventStream<Value> {
    /// Map every value through `transform`, keeping only `Some` results
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let parsed = lines.compact_map(|line: String| line.parse::<i32>().ok());
    /// ```
    pub fn compact_map<Result, Transform>(&self, transform: Transform) -> EventStream<Result>
    where
        Result: Clone + Send + Sync + 'static,
        Transform: Fn(Value) -> Option<Result> + Send + Sync + 'static,
    {
        self.map(transform).compact()
    }
}
