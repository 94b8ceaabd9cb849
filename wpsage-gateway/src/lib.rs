//! HTTP API gateway for WPSage remote site administration.
//!
//! Serves four fixed operations under `/wp-json/wpsage/v1`: an
//! unauthenticated health check, a site snapshot, raw SQL execution and
//! raw code execution. The last three require the site's API key.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod snapshot;
pub mod state;
