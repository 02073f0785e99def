// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event - a value paired with the moment it was published
//!
//! An `Event<Value>` is the unit that flows through every stream: the
//! payload plus a wall-clock timestamp stamped at publication. Events are
//! immutable once created.
//!
//! Equality and hashing are structural and available exactly when `Value`
//! supports them, so events can be collected into sets or compared in tests
//! without any extra ceremony.
//!
//! # Examples
//!
//! ```rust,ignore
//! let event = Event::new("hello");
//! assert_eq!(event.value, "hello");
//!
//! // Replaying with a known time, e.g. in tests
//! let replayed = Event::at("hello", event.time);
//! assert_eq!(event, replayed);
//! ```

use chrono::{DateTime, Utc};

/// Wall-clock time used to stamp events and drive timer sources
pub type Timestamp = DateTime<Utc>;

/// A single stream occurrence: a value and its publication time
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Event<Value> {
    /// The payload carried by this occurrence
    pub value: Value,
    /// When the occurrence was published
    pub time: Timestamp,
}

impl<Value> Event<Value> {
    /// Create an event stamped with the current time
    pub fn new(value: Value) -> Self {
        Self {
            value,
            time: Utc::now(),
        }
    }

    /// Create an event with an explicit timestamp
    ///
    /// Operators that transform a value without changing when it occurred
    /// (map, accumulate) use this to carry the upstream time through.
    pub fn at(value: Value, time: Timestamp) -> Self {
        Self { value, time }
    }
}
