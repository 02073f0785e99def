// Copyright (c) 2025 - Cowboy AI, Inc.
//! awaited - resolve a stream of single-shot futures
//!
//! Bridges externally-driven asynchronous results into the synchronous
//! stream world: each future arriving on the source stream is spawned on
//! the ambient tokio runtime, and its output is published when it
//! resolves. Outputs are stamped at resolution time and arrive in
//! completion order, which is unspecified relative to the source order.
//!
//! The futures flowing through the source stream must be `Clone` (channel
//! fan-out clones events); [`SharedTask`] is the ready-made shape for
//! that - any future boxed and shared:
//!
//! ```rust,ignore
//! use futures::FutureExt;
//!
//! let task: SharedTask<i32> = async { expensive().await }.boxed().shared();
//! tasks.publish(task);
//! ```
//!
//! Completion of the source stream is forwarded as-is; it does not wait
//! for still-running futures, whose late outputs are dropped by the
//! completed stream.

use std::future::Future;

use futures::future::{BoxFuture, Shared};

use crate::stream::EventStream;

/// A clonable single-shot asynchronous result
pub type SharedTask<Value> = Shared<BoxFuture<'static, Value>>;

impl<Task> EventStream<Task>
where
    Task: Future + Clone + Send + Sync + 'static,
    Task::Output: Clone + Send + Sync + 'static,
{
    /// Publish each future's output as it resolves
    ///
    /// Must be called with a tokio runtime ambient; each arriving future
    /// is handed to `tokio::spawn`.
    pub fn awaited(&self) -> EventStream<Task::Output> {
        let source = self.clone();
        EventStream::new(
            move |input| {
                let completion_input = input.clone();
                source.subscribe_with_completion(
                    move |task| {
                        let task_input = input.clone();
                        tokio::spawn(async move {
                            let value = task.await;
                            task_input.publish_value(value);
                        });
                    },
                    move || completion_input.complete(),
                )
            },
            drop,
        )
    }
}
