// Copyright (c) 2025 - Cowboy AI, Inc.
//! map - transform every value in a stream
//!
//! The mapped stream republishes `transform(value)` for each upstream
//! event, keeping the upstream timestamp (transforming a value does not
//! change when it occurred). Completion is forwarded unchanged.

use crate::event::Event;
use crate::stream::EventStream;

impl<Value: Clone + Send + Sync + 'static> EventStream<Value> {
    /// Transform every value with `transform`
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let strings = numbers.map(|n: i32| n.to_string());
    /// ```
    pub fn map<Result, Transform>(&self, transform: Transform) -> EventStream<Result>
    where
        Result: Clone + Send + Sync + 'static,
        Transform: Fn(Value) -> Result + Send + Sync + 'static,
    {
        let source = self.clone();
        EventStream::new(
            move |input| {
                let completion_input = input.clone();
                source.subscribe_events_with_completion(
                    move |event| input.publish(Event::at(transform(event.value), event.time)),
                    move || completion_input.complete(),
                )
            },
            drop,
        )
    }
}
