//! Fuzz target: splitting interpreter stdout at the return-value sentinel.
//!
//! Splitting and decoding must never panic, whatever the payload printed.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wpsage_executor::php::{decode_return_value, split_output};

const SENTINEL: &str = "__WPSAGE_RETURN_00000000000000000000000000000000__";

fuzz_target!(|data: &[u8]| {
    let stdout = String::from_utf8_lossy(data);
    if let Some((printed, encoded)) = split_output(&stdout, SENTINEL) {
        assert!(printed.len() + encoded.len() < stdout.len());
        let _ = decode_return_value(encoded);
    }
});
