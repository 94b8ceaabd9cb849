//! Error types for the executor crate.

/// Errors that can occur while running a code payload.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExecutorError {
    /// Code execution is switched off for this deployment.
    #[error("code execution is disabled on this site")]
    Disabled,

    /// The interpreter process could not be started.
    #[error("failed to start interpreter: {0}")]
    SpawnFailed(String),

    /// The payload did not finish within its deadline.
    #[error("execution timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The payload aborted before producing a return value.
    #[error("script failed with exit code {exit_code}: {message}")]
    ScriptFailed { exit_code: i32, message: String },

    /// The return value could not be decoded.
    #[error("malformed return value: {0}")]
    MalformedResult(String),

    /// Underlying I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
