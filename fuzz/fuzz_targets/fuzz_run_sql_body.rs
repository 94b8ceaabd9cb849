//! Fuzz target: lenient parsing of the `run-sql` request body.
//!
//! Arbitrary bytes must never panic; anything unparseable becomes an empty
//! query.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wpsage_gateway::routes::SqlBody;

fuzz_target!(|data: &[u8]| {
    let body = SqlBody::from_slice(data);
    if std::str::from_utf8(data).is_err() {
        assert!(body.query.is_empty(), "invalid UTF-8 cannot yield a query");
    }
});
