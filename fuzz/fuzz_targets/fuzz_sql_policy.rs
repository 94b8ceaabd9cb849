//! Fuzz target: SQL whitelist classification.
//!
//! The restricted policy must accept a statement exactly when its leading
//! keyword is whitelisted, and never panic on arbitrary text.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wpsage_core::{leading_keyword, SqlPolicy, ALLOWED_OPERATIONS};

fuzz_target!(|data: &[u8]| {
    let Ok(query) = std::str::from_utf8(data) else {
        return;
    };
    let allowed = ALLOWED_OPERATIONS.contains(&leading_keyword(query).as_str());
    assert_eq!(SqlPolicy::restricted().check(query).is_ok(), allowed);
    assert!(SqlPolicy::permissive().check(query).is_ok());
});
