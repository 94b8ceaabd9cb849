//! Error types for the gateway crate.
//!
//! Every error renders as `{code, message, data: {status}}` JSON so callers
//! never see a raw panic or backtrace.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use wpsage_core::CoreError;
use wpsage_executor::ExecutorError;
use wpsage_store::StoreError;

/// Errors that can occur during gateway request handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The supplied API key does not match the stored one.
    #[error("Invalid API Key")]
    Forbidden,

    /// The request was rejected by a core policy (SQL whitelist).
    #[error(transparent)]
    Policy(#[from] CoreError),

    /// `run-sql` was called without a query.
    #[error("SQL query is required")]
    InvalidQuery,

    /// `run-php` was called without code.
    #[error("PHP code is required")]
    InvalidCode,

    /// The data store rejected the query.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The query did not finish within the configured deadline.
    #[error("query timed out after {secs}s")]
    QueryTimeout { secs: u64 },

    /// The blocking query task panicked or was cancelled.
    #[error("query task failed: {0}")]
    QueryTask(String),

    /// The blocking api key reload task panicked or was cancelled.
    #[error("api key reload task failed: {0}")]
    ReloadTask(String),

    /// An error propagated from the execution backend.
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

impl GatewayError {
    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Forbidden => "rest_forbidden",
            GatewayError::Policy(CoreError::ForbiddenOperation { .. }) => "forbidden_operation",
            GatewayError::Policy(_) | GatewayError::ReloadTask(_) => "internal_error",
            GatewayError::InvalidQuery => "invalid_query",
            GatewayError::InvalidCode => "invalid_code",
            GatewayError::Store(_) | GatewayError::QueryTimeout { .. } | GatewayError::QueryTask(_) => {
                "query_error"
            }
            GatewayError::Executor(ExecutorError::Disabled) => "code_execution_disabled",
            GatewayError::Executor(_) => "execution_error",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Forbidden
            | GatewayError::Policy(CoreError::ForbiddenOperation { .. })
            | GatewayError::Executor(ExecutorError::Disabled) => StatusCode::FORBIDDEN,
            GatewayError::InvalidQuery | GatewayError::InvalidCode => StatusCode::BAD_REQUEST,
            GatewayError::Policy(_)
            | GatewayError::Store(_)
            | GatewayError::QueryTimeout { .. }
            | GatewayError::QueryTask(_)
            | GatewayError::ReloadTask(_)
            | GatewayError::Executor(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        if status.is_server_error() {
            tracing::error!(code, error = %self, "request failed");
        }
        let body = json!({
            "code": code,
            "message": self.to_string(),
            "data": {"status": status.as_u16()},
        });
        (status, Json(body)).into_response()
    }
}
