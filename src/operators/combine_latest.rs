// Copyright (c) 2025 - Cowboy AI, Inc.
//! combine_latest - pair the latest value from each source
//!
//! The binary form holds an `Option` slot per side; once both slots have
//! been filled at least once, every subsequent single-side update publishes
//! a fresh pair of the new value with the other side's latest. The 3- and
//! 4-ary forms are pairwise composition plus a flattening map, and the
//! array form generalizes to a homogeneous list of sources.
//!
//! # Completion
//!
//! Each side's completion removes that side's subscription from the
//! still-open set; the combined stream completes once the set is empty.
//! One uniform early exit applies to every form: a source that completes
//! without ever publishing leaves its slot permanently unfillable, so the
//! combination can never publish again - it completes immediately and the
//! remaining subscriptions are cancelled.
//!
//! Combined values are stamped at publication time: a pair is a new
//! occurrence, distinct from either side's event.
//!
//! # Ownership
//!
//! Operator state lives behind an `Arc<Mutex<..>>` held by the stream's
//! registrant; upstream callbacks reach it only through a `Weak`, so the
//! upstream channels never keep the combined stream's state alive. The
//! state owns the upstream subscriptions (which retain the source
//! streams), and the state lock is never held while publishing downstream.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use crate::stream::EventStream;
use crate::subscription::Subscription;

struct PairState<Value1, Value2> {
    latest1: Option<Value1>,
    latest2: Option<Value2>,
    subscriptions: HashMap<u8, Subscription>,
    open: usize,
}

type SharedPairState<Value1, Value2> = Arc<Mutex<PairState<Value1, Value2>>>;

fn lock_pair<Value1, Value2>(
    state: &SharedPairState<Value1, Value2>,
) -> std::sync::MutexGuard<'_, PairState<Value1, Value2>> {
    state.lock().expect("combine-latest state poisoned")
}

/// Outcome of one side completing, computed under the state lock
fn pair_side_completed<Value1, Value2>(
    state: &Weak<Mutex<PairState<Value1, Value2>>>,
    side: u8,
    ever_published: impl Fn(&PairState<Value1, Value2>) -> bool,
) -> (Vec<Subscription>, bool) {
    let Some(state) = state.upgrade() else {
        return (Vec::new(), false);
    };
    let mut state = lock_pair(&state);
    state.open = state.open.saturating_sub(1);

    if !ever_published(&state) {
        // This slot can never be filled; the pair can never publish again
        debug!(side, "combine-latest source completed without publishing");
        let cancelled = state.subscriptions.drain().map(|(_, s)| s).collect();
        (cancelled, true)
    } else {
        let cancelled = state.subscriptions.remove(&side).into_iter().collect();
        let complete_now = state.open == 0;
        (cancelled, complete_now)
    }
}

impl<Value: Clone + Send + Sync + 'static> EventStream<Value> {
    /// Combine with another stream, publishing the latest pair
    ///
    /// No output is produced until both sides have published at least once.
    pub fn combine_latest<Other>(&self, other: &EventStream<Other>) -> EventStream<(Value, Other)>
    where
        Other: Clone + Send + Sync + 'static,
    {
        let source1 = self.clone();
        let source2 = other.clone();
        EventStream::new(
            move |input| {
                let state: SharedPairState<Value, Other> = Arc::new(Mutex::new(PairState {
                    latest1: None,
                    latest2: None,
                    subscriptions: HashMap::new(),
                    open: 2,
                }));

                let subscription1 = {
                    let value_state = Arc::downgrade(&state);
                    let value_input = input.clone();
                    let completion_state = Arc::downgrade(&state);
                    let completion_input = input.clone();
                    source1.subscribe_with_completion(
                        move |value| {
                            let Some(state) = value_state.upgrade() else {
                                return;
                            };
                            let pair = {
                                let mut state = lock_pair(&state);
                                state.latest1 = Some(value);
                                latest_pair(&state)
                            };
                            if let Some(pair) = pair {
                                value_input.publish_value(pair);
                            }
                        },
                        move || {
                            let (cancelled, complete_now) =
                                pair_side_completed(&completion_state, 1, |state| {
                                    state.latest1.is_some()
                                });
                            drop(cancelled);
                            if complete_now {
                                completion_input.complete();
                            }
                        },
                    )
                };

                let subscription2 = {
                    let value_state = Arc::downgrade(&state);
                    let value_input = input.clone();
                    let completion_state = Arc::downgrade(&state);
                    let completion_input = input.clone();
                    source2.subscribe_with_completion(
                        move |value| {
                            let Some(state) = value_state.upgrade() else {
                                return;
                            };
                            let pair = {
                                let mut state = lock_pair(&state);
                                state.latest2 = Some(value);
                                latest_pair(&state)
                            };
                            if let Some(pair) = pair {
                                value_input.publish_value(pair);
                            }
                        },
                        move || {
                            let (cancelled, complete_now) =
                                pair_side_completed(&completion_state, 2, |state| {
                                    state.latest2.is_some()
                                });
                            drop(cancelled);
                            if complete_now {
                                completion_input.complete();
                            }
                        },
                    )
                };

                {
                    let mut state = lock_pair(&state);
                    state.subscriptions.insert(1, subscription1);
                    state.subscriptions.insert(2, subscription2);
                }
                state
            },
            drop,
        )
    }

    /// Combine with two other streams into a triple
    pub fn combine_latest3<Other1, Other2>(
        &self,
        other1: &EventStream<Other1>,
        other2: &EventStream<Other2>,
    ) -> EventStream<(Value, Other1, Other2)>
    where
        Other1: Clone + Send + Sync + 'static,
        Other2: Clone + Send + Sync + 'static,
    {
        self.combine_latest(other1)
            .combine_latest(other2)
            .map(|((first, second), third)| (first, second, third))
    }

    /// Combine with three other streams into a quadruple
    pub fn combine_latest4<Other1, Other2, Other3>(
        &self,
        other1: &EventStream<Other1>,
        other2: &EventStream<Other2>,
        other3: &EventStream<Other3>,
    ) -> EventStream<(Value, Other1, Other2, Other3)>
    where
        Other1: Clone + Send + Sync + 'static,
        Other2: Clone + Send + Sync + 'static,
        Other3: Clone + Send + Sync + 'static,
    {
        self.combine_latest3(other1, other2)
            .combine_latest(other3)
            .map(|((first, second, third), fourth)| (first, second, third, fourth))
    }

    /// Combine a list of homogeneous streams, publishing the latest of each
    ///
    /// Output vectors are ordered by source position. With no sources the
    /// stream never publishes and never completes.
    pub fn combine_latest_all(sources: Vec<EventStream<Value>>) -> EventStream<Vec<Value>> {
        EventStream::new(
            move |input| {
                let state = Arc::new(Mutex::new(ArrayState::<Value> {
                    latest: vec![None; sources.len()],
                    subscriptions: HashMap::new(),
                    open: sources.len(),
                }));

                for (index, source) in sources.iter().enumerate() {
                    let value_state = Arc::downgrade(&state);
                    let value_input = input.clone();
                    let completion_state = Arc::downgrade(&state);
                    let completion_input = input.clone();

                    let subscription = source.subscribe_with_completion(
                        move |value| {
                            let Some(state) = value_state.upgrade() else {
                                return;
                            };
                            let ready = {
                                let mut state =
                                    state.lock().expect("combine-latest state poisoned");
                                state.latest[index] = Some(value);
                                latest_values(&state)
                            };
                            if let Some(values) = ready {
                                value_input.publish_value(values);
                            }
                        },
                        move || {
                            let Some(state) = completion_state.upgrade() else {
                                return;
                            };
                            let (cancelled, complete_now) = {
                                let mut state =
                                    state.lock().expect("combine-latest state poisoned");
                                state.open = state.open.saturating_sub(1);
                                if state.latest[index].is_none() {
                                    debug!(
                                        index,
                                        "combine-latest source completed without publishing"
                                    );
                                    let cancelled: Vec<Subscription> =
                                        state.subscriptions.drain().map(|(_, s)| s).collect();
                                    (cancelled, true)
                                } else {
                                    let cancelled: Vec<Subscription> =
                                        state.subscriptions.remove(&index).into_iter().collect();
                                    (cancelled, state.open == 0)
                                }
                            };
                            drop(cancelled);
                            if complete_now {
                                completion_input.complete();
                            }
                        },
                    );

                    state
                        .lock()
                        .expect("combine-latest state poisoned")
                        .subscriptions
                        .insert(index, subscription);
                }
                state
            },
            drop,
        )
    }
}

fn latest_pair<Value1: Clone, Value2: Clone>(
    state: &PairState<Value1, Value2>,
) -> Option<(Value1, Value2)> {
    match (&state.latest1, &state.latest2) {
        (Some(first), Some(second)) => Some((first.clone(), second.clone())),
        _ => None,
    }
}

struct ArrayState<Value> {
    latest: Vec<Option<Value>>,
    subscriptions: HashMap<usize, Subscription>,
    open: usize,
}

fn latest_values<Value: Clone>(state: &ArrayState<Value>) -> Option<Vec<Value>> {
    state
        .latest
        .iter()
        .map(|slot| slot.clone())
        .collect::<Option<Vec<Value>>>()
}

#[cfg(test)]
mod tests {
    use crate::channel::Channel;
    use crate::stream::EventStream;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn paired_channels<T: Clone + Send + Sync + 'static>() -> (Channel<T>, Channel<()>, EventStream<T>) {
        let values = Channel::new();
        let completions = Channel::new();
        let stream = EventStream::from_value_channel(&values, &completions);
        (values, completions, stream)
    }

    #[test]
    fn test_no_output_until_both_sides_published() {
        let (values1, _completions1, stream1) = paired_channels::<i32>();
        let (values2, _completions2, stream2) = paired_channels::<&str>();

        let combined = stream1.combine_latest(&stream2);
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let _subscription = combined.subscribe(move |pair| sink.lock().unwrap().push(pair));

        values1.publish(1);
        values1.publish(2);
        assert!(received.lock().unwrap().is_empty());

        values2.publish("a");
        assert_eq!(*received.lock().unwrap(), vec![(2, "a")]);
    }

    #[test]
    fn test_single_side_update_republishes_latest_pair() {
        let (values1, _completions1, stream1) = paired_channels::<i32>();
        let (values2, _completions2, stream2) = paired_channels::<&str>();

        let combined = stream1.combine_latest(&stream2);
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let _subscription = combined.subscribe(move |pair| sink.lock().unwrap().push(pair));

        values1.publish(1);
        values2.publish("a");
        values1.publish(2);
        values2.publish("b");

        assert_eq!(
            *received.lock().unwrap(),
            vec![(1, "a"), (2, "a"), (2, "b")]
        );
    }

    #[test]
    fn test_completes_only_after_both_sides_complete() {
        let (values1, completions1, stream1) = paired_channels::<i32>();
        let (values2, completions2, stream2) = paired_channels::<i32>();

        let combined = stream1.combine_latest(&stream2);
        let completed = Arc::new(Mutex::new(false));
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let flag = completed.clone();
        let _subscription = combined.subscribe_with_completion(
            move |pair| sink.lock().unwrap().push(pair),
            move || *flag.lock().unwrap() = true,
        );

        values1.publish(1);
        values2.publish(10);

        completions1.publish(());
        assert!(!*completed.lock().unwrap());

        // The live side still pairs with the completed side's frozen value
        values2.publish(20);
        assert_eq!(*received.lock().unwrap(), vec![(1, 10), (1, 20)]);

        completions2.publish(());
        assert!(*completed.lock().unwrap());
    }

    #[test]
    fn test_side_completing_without_publishing_fast_completes() {
        let (values1, _completions1, stream1) = paired_channels::<i32>();
        let (_values2, completions2, stream2) = paired_channels::<i32>();

        let combined = stream1.combine_latest(&stream2);
        let completed = Arc::new(Mutex::new(false));
        let flag = completed.clone();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let _subscription = combined.subscribe_with_completion(
            move |pair| sink.lock().unwrap().push(pair),
            move || *flag.lock().unwrap() = true,
        );

        values1.publish(1);
        completions2.publish(());

        assert!(*completed.lock().unwrap());

        // The other side is unsubscribed; nothing further flows
        values1.publish(2);
        assert!(received.lock().unwrap().is_empty());
    }

    #[test]
    fn test_combine_latest3_flattens_to_triple() {
        let (values1, _c1, stream1) = paired_channels::<i32>();
        let (values2, _c2, stream2) = paired_channels::<i32>();
        let (values3, _c3, stream3) = paired_channels::<i32>();

        let combined = stream1.combine_latest3(&stream2, &stream3);
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let _subscription = combined.subscribe(move |triple| sink.lock().unwrap().push(triple));

        values1.publish(1);
        values2.publish(2);
        values3.publish(3);
        values1.publish(10);

        assert_eq!(*received.lock().unwrap(), vec![(1, 2, 3), (10, 2, 3)]);
    }

    #[test]
    fn test_combine_latest4_flattens_to_quadruple() {
        let (values1, _c1, stream1) = paired_channels::<i32>();
        let (values2, _c2, stream2) = paired_channels::<i32>();
        let (values3, _c3, stream3) = paired_channels::<i32>();
        let (values4, _c4, stream4) = paired_channels::<i32>();

        let combined = stream1.combine_latest4(&stream2, &stream3, &stream4);
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let _subscription = combined.subscribe(move |quad| sink.lock().unwrap().push(quad));

        values1.publish(1);
        values2.publish(2);
        values3.publish(3);
        values4.publish(4);

        assert_eq!(*received.lock().unwrap(), vec![(1, 2, 3, 4)]);
    }

    #[test]
    fn test_array_combine_publishes_positional_latest() {
        let channels: Vec<(Channel<i32>, Channel<()>, EventStream<i32>)> =
            (0..3).map(|_| paired_channels()).collect();
        let sources = channels.iter().map(|(_, _, s)| s.clone()).collect();

        let combined = EventStream::combine_latest_all(sources);
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let _subscription = combined.subscribe(move |values| sink.lock().unwrap().push(values));

        channels[0].0.publish(0);
        channels[1].0.publish(10);
        channels[2].0.publish(20);
        channels[1].0.publish(11);

        assert_eq!(
            *received.lock().unwrap(),
            vec![vec![0, 10, 20], vec![0, 11, 20]]
        );
    }

    #[test]
    fn test_array_source_completing_unpublished_completes_combination() {
        let channels: Vec<(Channel<i32>, Channel<()>, EventStream<i32>)> =
            (0..3).map(|_| paired_channels()).collect();
        let sources = channels.iter().map(|(_, _, s)| s.clone()).collect();

        let combined = EventStream::combine_latest_all(sources);
        let completed = Arc::new(Mutex::new(false));
        let flag = completed.clone();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let _subscription = combined.subscribe_with_completion(
            move |values| sink.lock().unwrap().push(values),
            move || *flag.lock().unwrap() = true,
        );

        channels[0].0.publish(0);
        channels[2].0.publish(20);

        // Source 1 completes having never published: position 1 is
        // permanently unfillable
        channels[1].1.publish(());

        assert!(*completed.lock().unwrap());
        assert!(received.lock().unwrap().is_empty());

        // Remaining sources were unsubscribed
        channels[0].0.publish(1);
        assert!(received.lock().unwrap().is_empty());
    }

    #[test]
    fn test_array_combine_completes_when_all_sources_complete() {
        let channels: Vec<(Channel<i32>, Channel<()>, EventStream<i32>)> =
            (0..2).map(|_| paired_channels()).collect();
        let sources = channels.iter().map(|(_, _, s)| s.clone()).collect();

        let combined = EventStream::combine_latest_all(sources);
        let completed = Arc::new(Mutex::new(false));
        let flag = completed.clone();
        let _subscription =
            combined.subscribe_with_completion(|_| {}, move || *flag.lock().unwrap() = true);

        channels[0].0.publish(0);
        channels[1].0.publish(1);

        channels[0].1.publish(());
        assert!(!*completed.lock().unwrap());

        channels[1].1.publish(());
        assert!(*completed.lock().unwrap());
    }
}
