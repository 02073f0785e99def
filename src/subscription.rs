// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subscription - a cancellable registration handle
//!
//! A `Subscription` represents one registration with one or more channels.
//! Dropping the handle cancels the registration; `cancel` does the same
//! thing explicitly. Cancellation runs at most once no matter how it is
//! triggered.
//!
//! # Composition
//!
//! - [`Subscription::aggregate`] bundles several subscriptions into one
//!   unit; cancelling the aggregate cancels every member.
//! - [`Subscription::retaining`] attaches an owner (typically an
//!   [`EventStream`](crate::stream::EventStream)) that must stay alive for
//!   as long as the subscription does. The ownership edge points one way
//!   only - the owner never references the subscription back - which is
//!   what keeps stream/subscriber graphs cycle-free.
//!
//! # Examples
//!
//! ```rust,ignore
//! let subscription = channel.subscribe(|value| println!("{value}"));
//! // ... deliveries happen ...
//! subscription.cancel(); // or just drop it
//! ```

use std::any::Any;

use tracing::trace;

type CancelAction = Box<dyn FnOnce() + Send>;

/// Handle for one registration; cancels on drop, at most once
pub struct Subscription {
    cancel: Option<CancelAction>,
    children: Vec<Subscription>,
    retained: Option<Box<dyn Any + Send>>,
}

impl Subscription {
    /// Create a subscription that runs `cancel` when cancelled or dropped
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
            children: Vec::new(),
            retained: None,
        }
    }

    /// A subscription with nothing to cancel
    pub fn empty() -> Self {
        Self {
            cancel: None,
            children: Vec::new(),
            retained: None,
        }
    }

    /// Bundle several subscriptions into a single unit
    ///
    /// Cancelling the aggregate cancels every member. Members cannot be
    /// removed individually afterwards; operators that need shrinking
    /// membership keep their own keyed map of subscriptions instead and
    /// drop entries as sources complete.
    pub fn aggregate(children: impl IntoIterator<Item = Subscription>) -> Self {
        Self {
            cancel: None,
            children: children.into_iter().collect(),
            retained: None,
        }
    }

    /// Extend `owner`'s lifetime to match `subscription`'s
    ///
    /// The owner is held until the subscription is cancelled or dropped,
    /// and released immediately after the cancel actions have run. Streams
    /// use this so that an active subscription alone keeps the stream (and
    /// transitively its upstream chain) alive.
    pub fn retaining<Owner: Send + 'static>(owner: Owner, subscription: Subscription) -> Self {
        Self {
            cancel: None,
            children: vec![subscription],
            retained: Some(Box::new(owner)),
        }
    }

    /// Cancel now instead of waiting for drop
    ///
    /// Consuming the handle makes repeated cancellation unrepresentable;
    /// the underlying action still runs at most once either way.
    pub fn cancel(self) {
        drop(self);
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            trace!("subscription cancelled");
            cancel();
        }
        for child in &mut self.children {
            child.run_cancel();
        }
        self.children.clear();
        // Release the retained owner only after every cancel action ran
        self.retained = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}
