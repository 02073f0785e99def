// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Stream Operators
//!
//! Every law here compares a stream pipeline against the equivalent
//! iterator pipeline over the same input: pushing a sequence through an
//! operator must observe exactly what the pure transformation produces,
//! in the same order.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use event_streams::{Channel, Event, EventStream};
use proptest::prelude::*;

/// Push `values` through `build`'s output stream and collect what arrives
fn observe<In, Out, Build>(values: &[In], build: Build) -> Vec<Out>
where
    In: Clone + Send + Sync + 'static,
    Out: Clone + Send + Sync + 'static,
    Build: FnOnce(&EventStream<In>) -> EventStream<Out>,
{
    let source = Channel::new();
    let stream = build(&source.to_stream());

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let _subscription = stream.subscribe(move |value| sink.lock().unwrap().push(value));

    for value in values {
        source.publish(value.clone());
    }

    let observed = received.lock().unwrap().clone();
    observed
}

proptest! {
    #[test]
    fn map_matches_iterator_map(values in prop::collection::vec(any::<i32>(), 0..50)) {
        let observed = observe(&values, |stream| stream.map(|v: i32| v.wrapping_mul(3)));
        let expected: Vec<i32> = values.iter().map(|v| v.wrapping_mul(3)).collect();
        prop_assert_eq!(observed, expected);
    }

    #[test]
    fn map_composition_law(values in prop::collection::vec(any::<i16>(), 0..50)) {
        // map(f).map(g) == map(g . f)
        let composed = observe(&values, |stream| {
            stream.map(|v: i16| v as i32 + 1).map(|v| v * 2)
        });
        let fused = observe(&values, |stream| stream.map(|v: i16| (v as i32 + 1) * 2));
        prop_assert_eq!(composed, fused);
    }

    #[test]
    fn filter_matches_iterator_filter(values in prop::collection::vec(any::<i32>(), 0..50)) {
        let observed = observe(&values, |stream| stream.filter(|v: &i32, _| v % 2 == 0));
        let expected: Vec<i32> = values.iter().copied().filter(|v| v % 2 == 0).collect();
        prop_assert_eq!(observed, expected);
    }

    #[test]
    fn compact_map_is_map_then_filter(values in prop::collection::vec(any::<i32>(), 0..50)) {
        let observed = observe(&values, |stream| {
            stream.compact_map(|v: i32| v.checked_add(1))
        });
        let expected: Vec<i32> = values.iter().filter_map(|v| v.checked_add(1)).collect();
        prop_assert_eq!(observed, expected);
    }

    #[test]
    fn accumulate_matches_iterator_scan(values in prop::collection::vec(any::<i32>(), 0..50)) {
        let observed = observe(&values, |stream| {
            stream.accumulate(0i64, |sum, v: i32| sum + v as i64)
        });
        let expected: Vec<i64> = values
            .iter()
            .scan(0i64, |sum, v| {
                *sum += *v as i64;
                Some(*sum)
            })
            .collect();
        prop_assert_eq!(observed, expected);
    }

    #[test]
    fn debounce_admits_exactly_the_watermark_subsequence(
        gaps_ms in prop::collection::vec(0i64..200, 1..40)
    ) {
        // Build strictly increasing offsets from arbitrary gaps
        let origin = DateTime::<Utc>::UNIX_EPOCH + Duration::days(365);
        let tolerance = Duration::milliseconds(100);

        let mut offset = 0i64;
        let mut events = Vec::new();
        for gap in &gaps_ms {
            offset += gap;
            events.push(Event::at(offset, origin + Duration::milliseconds(offset)));
        }

        let event_channel = Channel::new();
        let completions = Channel::new();
        let debounced =
            EventStream::from_channels(&event_channel, &completions).debounce(tolerance);

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let _subscription = debounced.subscribe(move |value| sink.lock().unwrap().push(value));

        for event in &events {
            event_channel.publish(event.clone());
        }

        // Reference model: admit iff gap from last admitted >= tolerance
        let mut watermark = DateTime::<Utc>::UNIX_EPOCH;
        let mut expected = Vec::new();
        for event in &events {
            if event.time - watermark >= tolerance {
                watermark = event.time;
                expected.push(event.value);
            }
        }

        let observed = received.lock().unwrap().clone();
        prop_assert_eq!(observed, expected);
    }
}
