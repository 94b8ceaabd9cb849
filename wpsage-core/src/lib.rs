//! Core types for the WPSage remote administration gateway.
//!
//! Defines the site snapshot, query and execution results, the SQL
//! operation whitelist, and the identifiers used to correlate executions.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod execution;
pub mod id;
pub mod policy;
pub mod snapshot;

pub use error::CoreError;
pub use execution::{ExecutionResult, QueryResult, QueryRow};
pub use id::ExecutionId;
pub use policy::{leading_keyword, SqlPolicy, ALLOWED_OPERATIONS};
pub use snapshot::{
    GeneralInfo, MenuInfo, PluginInfo, PostSummary, SidebarInfo, Snapshot, ThemeInfo,
    AGENT_NAME, RECENT_POSTS_LIMIT,
};

/// Option name under which the gateway credential is stored.
pub const API_KEY_OPTION: &str = "wpsage_api_key";
