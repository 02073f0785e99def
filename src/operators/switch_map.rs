// Copyright (c) 2025 - Cowboy AI, Inc.
//! switch_map - follow the most recent inner stream
//!
//! Every outer value is mapped to an inner stream; the operator republishes
//! the current inner stream's events and drops the previous inner
//! subscription the moment a new outer value arrives. Cancellation of the
//! superseded subscription takes effect before any further propagation, so
//! an event already in flight through a superseded inner stream never
//! reaches the output.
//!
//! # Completion
//!
//! The output completes once the outer stream has completed *and* the inner
//! stream that was current at that point has completed ("no inner yet"
//! counts as complete). An inner stream completing on its own, while still
//! current, does not complete the output - the output stays alive awaiting
//! the next outer value or outer completion.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::stream::EventStream;
use crate::subscription::Subscription;

struct SwitchState {
    inner_subscription: Option<Subscription>,
    outer_completed: bool,
    inner_completed: bool,
}

fn lock_switch(state: &Mutex<SwitchState>) -> MutexGuard<'_, SwitchState> {
    state.lock().expect("switch-map state poisoned")
}

/// Registrant: the outer subscription plus the shared inner-tracking state
struct SwitchRegistrant {
    _outer: Subscription,
    _state: Arc<Mutex<SwitchState>>,
}

impl<Value: Clone + Send + Sync + 'static> EventStream<Value> {
    /// Map each outer value to an inner stream and follow the latest one
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let results = queries.switch_map(move |query| search(query));
    /// ```
    pub fn switch_map<Inner, Transform>(&self, transform: Transform) -> EventStream<Inner>
    where
        Inner: Clone + Send + Sync + 'static,
        Transform: Fn(Value) -> EventStream<Inner> + Send + Sync + 'static,
    {
        let source = self.clone();
        EventStream::new(
            move |input| {
                let state = Arc::new(Mutex::new(SwitchState {
                    inner_subscription: None,
                    outer_completed: false,
                    inner_completed: true,
                }));

                let value_state = Arc::downgrade(&state);
                let value_input = input.clone();
                let completion_state = Arc::downgrade(&state);
                let completion_input = input.clone();

                let outer = source.subscribe_with_completion(
                    move |value| {
                        let Some(state) = value_state.upgrade() else {
                            return;
                        };

                        // Cancel the superseded inner subscription before
                        // anything of the new inner stream can propagate
                        let superseded = {
                            let mut state = lock_switch(&state);
                            state.inner_completed = false;
                            state.inner_subscription.take()
                        };
                        drop(superseded);

                        let inner_stream = transform(value);

                        let event_input = value_input.clone();
                        let inner_state = Arc::downgrade(&state);
                        let inner_input = value_input.clone();
                        let inner_subscription = inner_stream.subscribe_events_with_completion(
                            move |event| event_input.publish(event),
                            move || {
                                let Some(state) = inner_state.upgrade() else {
                                    return;
                                };
                                let (finished, complete_now) = {
                                    let mut state = lock_switch(&state);
                                    state.inner_completed = true;
                                    (state.inner_subscription.take(), state.outer_completed)
                                };
                                drop(finished);
                                if complete_now {
                                    inner_input.complete();
                                }
                            },
                        );

                        lock_switch(&state).inner_subscription = Some(inner_subscription);
                    },
                    move || {
                        let Some(state) = completion_state.upgrade() else {
                            return;
                        };
                        let complete_now = {
                            let mut state = lock_switch(&state);
                            state.outer_completed = true;
                            state.inner_completed
                        };
                        if complete_now {
                            completion_input.complete();
                        }
                    },
                );

                SwitchRegistrant {
                    _outer: outer,
                    _state: state,
                }
            },
            drop,
        )
    }
}
