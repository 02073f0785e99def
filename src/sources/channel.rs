// Copyright (c) 2025 - Cowboy AI, Inc.
//! Channel-backed stream source
//!
//! The simplest source: every value published on the channel becomes an
//! event stamped at forwarding time. The resulting stream never completes
//! (pair a channel with a completion channel via
//! [`EventStream::from_value_channel`] when completion is needed).

use crate::channel::Channel;
use crate::stream::EventStream;

impl<T: Clone + Send + Sync + 'static> Channel<T> {
    /// View this channel as a never-completing stream of its values
    ///
    /// The stream subscribes to the channel for its own lifetime; the
    /// channel itself is unaffected and can keep serving other
    /// subscribers.
    pub fn to_stream(&self) -> EventStream<T> {
        let values = self.clone();
        EventStream::new(
            move |input| values.subscribe(move |value| input.publish_value(value)),
            drop,
        )
    }
}
