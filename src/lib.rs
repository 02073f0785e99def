// Copyright (c) 2025 - Cowboy AI, Inc.
//! Push-based reactive event streams
//!
//! This crate provides an in-process event-stream engine built from two
//! primitives and a stream abstraction on top of them:
//!
//! - [`Channel`] - a typed broadcast point; `publish` fans out
//!   synchronously to every subscriber.
//! - [`Subscription`] - a cancellable registration handle; composable by
//!   aggregation and able to extend a stream's lifetime (retaining).
//! - [`EventStream`] - a hot, shareable stream wired up once at
//!   construction against an internal channel pair (events + completion),
//!   with per-listener `subscribe` and a library of operators.
//!
//! # Architecture
//!
//! ```text
//!  producer ──publish──► Channel<Event<V>> ──┬──► subscriber callback
//!                                            ├──► subscriber callback
//!  EventStream<V> owns the channel pair      └──► operator stream ──► ...
//!  and the producer registration; operator
//!  streams own their upstream subscriptions
//! ```
//!
//! Everything is synchronous and push-based: publishing runs subscriber
//! callbacks on the publishing thread, operators are just subscribers that
//! republish into their own channels, and completion flows through a
//! parallel channel with the same mechanics. The only asynchronous pieces
//! are at the edges: the tokio-backed [`TokioScheduler`] driving timed
//! sequence sources, and the `awaited` bridge resolving streams of
//! futures.
//!
//! # Ownership model
//!
//! Subscriptions own their stream (not the other way around): subscribing
//! returns a handle that retains the stream, and through it the whole
//! upstream chain, for exactly as long as the handle lives. Channels hold
//! subscriber callbacks in a token-keyed registry, so cancellation is a
//! key removal and no reference cycles form. When the last owner of a
//! stream goes away its producer registration is undone exactly once.
//!
//! # Example
//!
//! ```rust,ignore
//! use event_streams::{Channel, EventStream};
//!
//! let clicks = Channel::new();
//! let labels = clicks
//!     .to_stream()
//!     .filter(|count: &u32, _time| count % 2 == 0)
//!     .map(|count| format!("click #{count}"));
//!
//! let subscription = labels.subscribe(|label| println!("{label}"));
//! clicks.publish(2);
//! ```
//!
//! # Threading
//!
//! All state is internally synchronized for memory safety, but ordering
//! guarantees are per-subscriber and only meaningful when one thread at a
//! time drives a given stream; see the [`channel`] module docs.

pub mod channel;
pub mod event;
pub mod operators;
pub mod scheduler;
pub mod sources;
pub mod stream;
pub mod subscription;

// Re-export the working surface
pub use channel::Channel;
pub use event::{Event, Timestamp};
pub use operators::awaited::SharedTask;
pub use scheduler::{Scheduler, TimerEntry, TimerHandle, TokioScheduler};
pub use stream::{EventStream, StreamInput};
pub use subscription::Subscription;
