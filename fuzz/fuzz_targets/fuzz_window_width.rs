//! Fuzz target for grouping frequency aliases and window assignment.
//!
//! Parsing must never panic. For an instant at or after the first event, a
//! parsed width must assign a window start between the grid origin and the
//! instant, and assigning that start again must return it unchanged.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tf_common::WindowWidth;

fuzz_target!(|data: &[u8]| {
    if data.len() < 16 {
        return;
    }
    let (instants, alias) = data.split_at(16);
    let (first, instant) = instants.split_at(8);
    let first = i64::from_le_bytes(first.try_into().unwrap());
    let micros = i64::from_le_bytes(instant.try_into().unwrap());

    let Ok(alias) = std::str::from_utf8(alias) else {
        return;
    };
    let Ok(width) = alias.parse::<WindowWidth>() else {
        return;
    };

    if let Some(origin) = width.origin(first.min(micros)) {
        assert!(origin <= first.min(micros));
        if let Some(start) = width.window_start(micros, origin) {
            assert!(origin <= start && start <= micros);
            assert_eq!(width.window_start(start, origin), Some(start));
        }
    }
    let _ = width.to_string().parse::<WindowWidth>();
});
