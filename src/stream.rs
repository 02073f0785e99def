// Copyright (c) 2025 - Cowboy AI, Inc.
//! EventStream - a shareable, hot, push-based stream
//!
//! An `EventStream<Value>` owns a pair of internal channels - one for
//! [`Event`]s, one for the stream-wide completion signal - and a producer
//! registration created exactly once, eagerly, at construction. Cloning a
//! stream clones the handle; every clone shares the same channels and the
//! same producer.
//!
//! # Lifecycle
//!
//! Construction runs the registration function immediately against a
//! [`StreamInput`] (the publish/complete side) and keeps whatever the
//! function returns as the *registrant*. When the last owner of the stream
//! goes away, the unregister action consumes the registrant, undoing the
//! registration - an explicit two-phase activate/deactivate lifecycle
//! driven by reference count rather than by scope.
//!
//! Subscribing never re-runs registration; it only adds a listener. Each
//! subscription retains the stream for its own lifetime, so a stream
//! reachable only through an active subscription keeps delivering events,
//! and releasing the last subscription releases the whole upstream chain.
//!
//! # Completion
//!
//! Completion is a one-time terminal signal carried on its own channel.
//! [`StreamInput::complete`] is idempotent, and any publish after
//! completion is a silent no-op; a completed stream is never re-opened.
//!
//! # Examples
//!
//! ```rust,ignore
//! let stream = EventStream::from_source(|input| {
//!     input.publish_value(1);
//!     input.publish_value(2);
//!     input.complete();
//! });
//!
//! let subscription = stream.subscribe(|value: i32| println!("{value}"));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::channel::Channel;
use crate::event::Event;
use crate::subscription::Subscription;

/// Publish/complete side of a stream, handed to the registration function
///
/// The input captures only the stream's channels and completion flag -
/// never the stream itself - so a producer holding an input does not keep
/// the stream alive.
pub struct StreamInput<Value> {
    events: Channel<Event<Value>>,
    completions: Channel<()>,
    completed: Arc<AtomicBool>,
}

impl<Value> Clone for StreamInput<Value> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            completions: self.completions.clone(),
            completed: self.completed.clone(),
        }
    }
}

impl<Value: Clone + Send + Sync + 'static> StreamInput<Value> {
    /// Publish a pre-stamped event; no-op once the stream has completed
    pub fn publish(&self, event: Event<Value>) {
        if self.completed.load(Ordering::SeqCst) {
            return;
        }
        self.events.publish(event);
    }

    /// Publish a value stamped with the current time
    pub fn publish_value(&self, value: Value) {
        self.publish(Event::new(value));
    }

    /// Signal that no further values will ever be published
    ///
    /// Idempotent; only the first call reaches subscribers.
    pub fn complete(&self) {
        if self.completed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("event stream completed");
        self.completions.publish(());
    }
}

struct StreamCore<Value> {
    events: Channel<Event<Value>>,
    completions: Channel<()>,
    completed: Arc<AtomicBool>,
    unregister: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl<Value> Drop for StreamCore<Value> {
    fn drop(&mut self) {
        let unregister = match self.unregister.get_mut() {
            Ok(slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(unregister) = unregister {
            debug!("event stream released, undoing registration");
            unregister();
        }
    }
}

/// Hot, shareable stream of [`Event`]s with a one-time completion signal
pub struct EventStream<Value> {
    core: Arc<StreamCore<Value>>,
}

impl<Value> Clone for EventStream<Value> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<Value: Clone + Send + Sync + 'static> EventStream<Value> {
    /// Construct a stream from a registration/unregistration pair
    ///
    /// `register` runs immediately, exactly once, and is given the stream's
    /// [`StreamInput`]; whatever it returns is kept as the registrant.
    /// `unregister` consumes the registrant exactly once, when the last
    /// owner (stream handle or retaining subscription) releases the stream.
    pub fn new<Registrant, Register, Unregister>(
        register: Register,
        unregister: Unregister,
    ) -> Self
    where
        Registrant: Send + 'static,
        Register: FnOnce(StreamInput<Value>) -> Registrant,
        Unregister: FnOnce(Registrant) + Send + 'static,
    {
        let events = Channel::new();
        let completions = Channel::new();
        let completed = Arc::new(AtomicBool::new(false));

        let registrant = register(StreamInput {
            events: events.clone(),
            completions: completions.clone(),
            completed: completed.clone(),
        });

        debug!("event stream registered");

        Self {
            core: Arc::new(StreamCore {
                events,
                completions,
                completed,
                unregister: Mutex::new(Some(Box::new(move || unregister(registrant)))),
            }),
        }
    }

    /// Construct from a fire-and-forget source function; nothing to undo
    pub fn from_source<Source>(source: Source) -> Self
    where
        Source: FnOnce(StreamInput<Value>),
    {
        Self::new(source, |()| {})
    }

    /// Wrap a pre-existing event/completion channel pair
    ///
    /// Everything published on `events` (and the first `completions`
    /// signal) is forwarded into the stream. The forwarding registrations
    /// are torn down when the stream is released.
    pub fn from_channels(events: &Channel<Event<Value>>, completions: &Channel<()>) -> Self {
        let events = events.clone();
        let completions = completions.clone();
        Self::new(
            move |input| {
                let event_input = input.clone();
                let event_forward = events.subscribe(move |event| event_input.publish(event));
                let completion_forward = completions.subscribe(move |()| input.complete());
                Subscription::aggregate([event_forward, completion_forward])
            },
            drop,
        )
    }

    /// Wrap a pre-existing value/completion channel pair
    ///
    /// Like [`from_channels`](Self::from_channels), but values are stamped
    /// at forwarding time.
    pub fn from_value_channel(values: &Channel<Value>, completions: &Channel<()>) -> Self {
        let values = values.clone();
        let completions = completions.clone();
        Self::new(
            move |input| {
                let value_input = input.clone();
                let value_forward = values.subscribe(move |value| value_input.publish_value(value));
                let completion_forward = completions.subscribe(move |()| input.complete());
                Subscription::aggregate([value_forward, completion_forward])
            },
            drop,
        )
    }

    /// Listen for events and the completion signal
    ///
    /// The returned subscription retains the stream: as long as it is held,
    /// the stream and its upstream chain stay alive even with no other
    /// owner.
    pub fn subscribe_events_with_completion(
        &self,
        on_event: impl Fn(Event<Value>) + Send + Sync + 'static,
        on_complete: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        let event_subscription = self.core.events.subscribe(on_event);
        let completion_subscription = self.core.completions.subscribe(move |()| on_complete());
        Subscription::retaining(
            self.clone(),
            Subscription::aggregate([event_subscription, completion_subscription]),
        )
    }

    /// Listen for events only
    pub fn subscribe_events(
        &self,
        on_event: impl Fn(Event<Value>) + Send + Sync + 'static,
    ) -> Subscription {
        Subscription::retaining(self.clone(), self.core.events.subscribe(on_event))
    }

    /// Listen for values and the completion signal
    pub fn subscribe_with_completion(
        &self,
        on_value: impl Fn(Value) + Send + Sync + 'static,
        on_complete: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        self.subscribe_events_with_completion(move |event| on_value(event.value), on_complete)
    }

    /// Listen for values only
    pub fn subscribe(&self, on_value: impl Fn(Value) + Send + Sync + 'static) -> Subscription {
        self.subscribe_events(move |event| on_value(event.value))
    }
}
