//! Execution backend abstraction trait.
//!
//! Allows swapping the interpreter that runs `run-php` payloads, or removing
//! the capability entirely, without touching the gateway.

use async_trait::async_trait;
use wpsage_core::ExecutionResult;

use crate::ExecutorError;

/// Runs a caller-supplied source string and captures its output.
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Cancel Safety
/// Implementations must be cancel safe: dropping the future must not leave
/// a payload running in the background.
#[async_trait]
pub trait CodeBackend: Send + Sync {
    /// Short name used in logs, e.g. `"php"`.
    fn name(&self) -> &'static str;

    /// Execute `code` and return its standard output and return value.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Disabled`] if the backend refuses all code.
    /// Returns [`ExecutorError::SpawnFailed`] or [`ExecutorError::Io`] if the
    /// runtime cannot be started, [`ExecutorError::Timeout`] if the payload
    /// exceeds its deadline, and [`ExecutorError::ScriptFailed`] if the
    /// payload aborts with a fatal error.
    async fn execute(&self, code: &str) -> Result<ExecutionResult, ExecutorError>;
}
