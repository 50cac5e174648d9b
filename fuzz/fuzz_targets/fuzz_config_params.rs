//! Fuzz target for temporal.json configuration parsing.
//!
//! Tests that parameter parsing and validation handle arbitrary input
//! without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tf_common::TemporalParams;

fuzz_target!(|data: &[u8]| {
    // Try to parse as JSON - should never panic, only return an error
    if let Ok(params) = serde_json::from_slice::<TemporalParams>(data) {
        let _ = params.validate();
    }
});
