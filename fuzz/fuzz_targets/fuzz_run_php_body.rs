//! Fuzz target: lenient parsing of the `run-php` request body.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wpsage_gateway::routes::CodeBody;

fuzz_target!(|data: &[u8]| {
    let _ = CodeBody::from_slice(data);
});
