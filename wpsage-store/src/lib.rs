//! Site storage for the WPSage gateway.
//!
//! Defines the seams the gateway talks to ([`ConfigStore`],
//! [`SiteDataProvider`], [`QueryBackend`]) and a SQLite implementation of
//! all three.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod memory;
pub mod provider;
pub mod sqlite;

pub use error::StoreError;
pub use memory::MemoryConfigStore;
pub use provider::{ConfigStore, QueryBackend, SiteDataProvider};
pub use sqlite::{excerpt_from_content, SqliteSite};
