//! Backend used when code execution is switched off.

use async_trait::async_trait;
use wpsage_core::ExecutionResult;

use crate::{CodeBackend, ExecutorError};

/// Rejects every payload with [`ExecutorError::Disabled`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledBackend;

#[async_trait]
impl CodeBackend for DisabledBackend {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn execute(&self, code: &str) -> Result<ExecutionResult, ExecutorError> {
        tracing::warn!(code_len = code.len(), "rejected code payload: execution disabled");
        Err(ExecutorError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_backend_rejects_everything() {
        match DisabledBackend.execute("return 1;").await {
            Err(ExecutorError::Disabled) => {}
            other => panic!("expected Disabled, got {other:?}"),
        }
    }
}
