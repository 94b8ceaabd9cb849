//! Code execution backends for the WPSage gateway.
//!
//! The gateway hands caller-supplied source to a [`CodeBackend`] and relays
//! whatever it returns. Backends run with the full privilege of the gateway
//! process: there is no sandbox.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod config;
pub mod disabled;
pub mod error;
pub mod php;

pub use backend::CodeBackend;
pub use config::{BackendKind, ExecLimits};
pub use disabled::DisabledBackend;
pub use error::ExecutorError;
pub use php::PhpProcessBackend;
