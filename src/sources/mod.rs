// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stream sources
//!
//! Constructors that build an [`EventStream`](crate::stream::EventStream)
//! from something that is not itself a stream: a raw [`Channel`]
//! (`Channel::to_stream`), or a sequence of time-tagged values driven by a
//! [`Scheduler`](crate::scheduler::Scheduler) (`sequence` / `timer`).
//!
//! [`Channel`]: crate::channel::Channel

pub mod channel;
pub mod sequence;
