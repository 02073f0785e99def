// Copyright (c) 2025 - Cowboy AI, Inc.
//! Channel - an in-process typed broadcast point
//!
//! A `Channel<T>` fans every published value out to all currently
//! registered subscribers, synchronously, on the publishing thread.
//! Channels are cheap handles over shared state: cloning a channel clones
//! the handle, not the subscriber set.
//!
//! # Delivery contract
//!
//! - Each subscriber observes values in strict publish order.
//! - No ordering is promised *across* subscribers within one publish.
//! - Cancelling a subscription from inside a callback is safe while a
//!   publish is iterating: subscribers already invoked in the pass are
//!   unaffected, the cancelled subscriber receives nothing further
//!   (including later in the same pass), and removal is always visible to
//!   the next publish.
//!
//! Callbacks run with no internal lock held, so a callback may freely
//! publish, subscribe, or cancel on the same channel re-entrantly.
//!
//! The per-subscriber ordering guarantee is only meaningful when a single
//! thread at a time drives a given channel; concurrent publishers are
//! memory-safe but interleave their deliveries unpredictably.
//!
//! # Examples
//!
//! ```rust,ignore
//! let channel = Channel::new();
//! let subscription = channel.subscribe(|value: i32| println!("{value}"));
//! channel.publish(1);
//! channel.publish(2);
//! subscription.cancel();
//! channel.publish(3); // delivered to no one
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::trace;
use uuid::Uuid;

use crate::subscription::Subscription;

type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// In-process broadcast point; clone to share the same subscriber set
pub struct Channel<T> {
    core: Arc<ChannelCore<T>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

/// Token-keyed subscriber registry; tokens are valid for exactly one removal
struct ChannelCore<T> {
    subscribers: Mutex<HashMap<Uuid, Callback<T>>>,
}

impl<T> ChannelCore<T> {
    fn registry(&self) -> MutexGuard<'_, HashMap<Uuid, Callback<T>>> {
        self.subscribers
            .lock()
            .expect("channel subscriber registry poisoned")
    }
}

impl<T: Clone + Send + Sync + 'static> Channel<T> {
    /// Create a channel with no subscribers
    pub fn new() -> Self {
        Self {
            core: Arc::new(ChannelCore {
                subscribers: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Deliver `value` to every currently registered subscriber
    ///
    /// Runs synchronously on the calling thread. The subscriber set is
    /// snapshotted at the start of the pass; each subscriber's liveness is
    /// re-checked immediately before its callback runs, so a cancellation
    /// performed inside the pass suppresses any remaining delivery to that
    /// subscriber without disturbing the others.
    pub fn publish(&self, value: T) {
        let snapshot: Vec<(Uuid, Callback<T>)> = self
            .core
            .registry()
            .iter()
            .map(|(token, callback)| (*token, callback.clone()))
            .collect();

        trace!(subscribers = snapshot.len(), "channel publish");

        for (token, callback) in snapshot {
            // Skip subscribers cancelled earlier in this same pass
            let live = self.core.registry().contains_key(&token);
            if live {
                callback(value.clone());
            }
        }
    }

    /// Register `callback` for every future publish
    ///
    /// The returned [`Subscription`] removes the callback when cancelled or
    /// dropped. The handle holds the registry weakly: a subscription alone
    /// never keeps a channel alive.
    pub fn subscribe(&self, callback: impl Fn(T) + Send + Sync + 'static) -> Subscription {
        let token = Uuid::new_v4();
        self.core.registry().insert(token, Arc::new(callback));

        trace!(%token, "channel subscribe");

        let core = Arc::downgrade(&self.core);
        Subscription::new(move || {
            if let Some(core) = core.upgrade() {
                core.registry().remove(&token);
                trace!(%token, "channel unsubscribe");
            }
        })
    }

    /// Number of currently registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.core.registry().len()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}
