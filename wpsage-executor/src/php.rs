//! PHP execution backend.
//!
//! Each payload runs in a fresh `php` child process fed over stdin. The
//! payload becomes the body of a closure; after the closure returns, its
//! return value is JSON-encoded and printed after a per-execution sentinel
//! line. Everything printed before the sentinel is the captured output.
//!
//! The child inherits the gateway's user, environment and working
//! directory. Nothing restricts what the payload can do.
//!
//! Because the payload is a function body rather than an `eval` string,
//! some input `eval` would accept is a parse error here:
//!
//! - top-level `use` imports and `namespace` declarations
//! - a trailing `?>` with no matching `<?php`, which leaves the closure
//!   unterminated
//! - `declare(strict_types=1)`, which must be the first statement of a file
//!
//! Such payloads fail with a non-zero exit and surface as
//! [`ExecutorError::ScriptFailed`].

use std::{
    path::PathBuf,
    process::Stdio,
    time::Instant,
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{info, warn};
use wpsage_core::{ExecutionId, ExecutionResult};

use crate::{CodeBackend, ExecLimits, ExecutorError};

/// Runs payloads with a PHP CLI interpreter.
#[derive(Debug, Clone)]
pub struct PhpProcessBackend {
    binary: PathBuf,
    limits: ExecLimits,
}

impl PhpProcessBackend {
    /// Create a backend that invokes `binary` under the given limits.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>, limits: ExecLimits) -> Self {
        Self { binary: binary.into(), limits }
    }

    /// Create a backend using `php` from `$PATH` and default limits.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new("php", ExecLimits::default())
    }
}

/// Marker line separating captured output from the encoded return value.
fn sentinel(id: &ExecutionId) -> String {
    format!("__WPSAGE_RETURN_{}__", id.simple())
}

/// Wrap `code` in a closure and print its JSON-encoded return value after
/// `sentinel`.
#[must_use]
pub fn build_script(code: &str, sentinel: &str) -> String {
    format!(
        "<?php\n\
         $__wpsage_return = (static function () {{\n{code}\n}})();\n\
         echo \"\\n{sentinel}\\n\", json_encode($__wpsage_return, JSON_PARTIAL_OUTPUT_ON_ERROR);\n"
    )
}

/// Split interpreter stdout into `(captured output, encoded return value)`.
///
/// Returns `None` if the sentinel never appeared, i.e. the payload exited
/// or died before returning.
#[must_use]
pub fn split_output<'a>(stdout: &'a str, sentinel: &str) -> Option<(&'a str, &'a str)> {
    let marker = format!("\n{sentinel}\n");
    let pos = stdout.rfind(&marker)?;
    Some((&stdout[..pos], &stdout[pos + marker.len()..]))
}

/// Decode the JSON text printed after the sentinel.
///
/// # Errors
/// Returns [`ExecutorError::MalformedResult`] if the text is not valid JSON.
pub fn decode_return_value(encoded: &str) -> Result<Value, ExecutorError> {
    let encoded = encoded.trim();
    // json_encode() yields false, printed as nothing, on unencodable values.
    if encoded.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(encoded).map_err(|e| ExecutorError::MalformedResult(e.to_string()))
}

#[async_trait]
impl CodeBackend for PhpProcessBackend {
    fn name(&self) -> &'static str {
        "php"
    }

    async fn execute(&self, code: &str) -> Result<ExecutionResult, ExecutorError> {
        let id = ExecutionId::new();
        let sentinel = sentinel(&id);
        let script = build_script(code, &sentinel);
        let wall_start = Instant::now();

        info!(%id, code_len = code.len(), binary = %self.binary.display(), "starting php execution");

        let mut child = Command::new(&self.binary)
            .args(["-d", "display_errors=stderr", "-d", "log_errors=0"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecutorError::SpawnFailed(format!("{}: {e}", self.binary.display())))?;

        let run = async move {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(script.as_bytes()).await?;
                // Closing stdin lets php start executing.
                drop(stdin);
            }
            child.wait_with_output().await
        };

        let output = if let Ok(result) = tokio::time::timeout(self.limits.timeout, run).await {
            result?
        } else {
            warn!(%id, timeout_secs = self.limits.timeout.as_secs(), "php execution timed out; child killed");
            return Err(ExecutorError::Timeout { secs: self.limits.timeout.as_secs() });
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let result = if let Some((printed, encoded)) = split_output(&stdout, &sentinel) {
            ExecutionResult::new(printed, decode_return_value(encoded)?)
        } else if output.status.success() {
            // The payload called exit() before returning.
            ExecutionResult::new(stdout.to_string(), Value::Null)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() { stdout.trim() } else { stderr.trim() };
            warn!(%id, exit_code = ?output.status.code(), "php payload failed");
            return Err(ExecutorError::ScriptFailed {
                exit_code: output.status.code().unwrap_or(-1),
                message: message.to_owned(),
            });
        };

        info!(
            %id,
            elapsed_ms = wall_start.elapsed().as_millis(),
            output_len = result.output.len(),
            "php execution complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_unique_per_execution() {
        let a = sentinel(&ExecutionId::new());
        let b = sentinel(&ExecutionId::new());
        assert_ne!(a, b);
        assert!(a.starts_with("__WPSAGE_RETURN_"));
    }

    #[test]
    fn build_script_embeds_code_inside_closure() {
        let script = build_script("echo 'hi'; return 42;", "MARK");
        assert!(script.starts_with("<?php\n"), "stdin scripts need an open tag");
        assert!(script.contains("function () {\necho 'hi'; return 42;\n})()"));
        assert!(script.contains(r#"echo "\nMARK\n""#));
    }

    #[test]
    fn split_output_separates_output_and_return_value() {
        match split_output("hi\nMARK\n42", "MARK") {
            Some((output, encoded)) => {
                assert_eq!(output, "hi");
                assert_eq!(encoded, "42");
            }
            None => panic!("sentinel should be found"),
        }
        assert!(split_output("hi", "MARK").is_none());
    }

    #[test]
    fn decode_return_value_handles_null_and_empty() {
        assert_eq!(decode_return_value("null").ok(), Some(Value::Null));
        assert_eq!(decode_return_value("").ok(), Some(Value::Null));
        assert_eq!(
            decode_return_value(r#"{"a":[1,2]}"#).ok(),
            Some(serde_json::json!({"a": [1, 2]}))
        );
        assert!(matches!(decode_return_value("{oops"), Err(ExecutorError::MalformedResult(_))));
    }

    #[tokio::test]
    async fn missing_binary_reports_spawn_failure() {
        let backend = PhpProcessBackend::new("/nonexistent/wpsage-php", ExecLimits::default());
        match backend.execute("return 1;").await {
            Err(ExecutorError::SpawnFailed(msg)) => assert!(msg.contains("wpsage-php")),
            other => panic!("expected SpawnFailed, got {other:?}"),
        }
    }

    proptest::proptest! {
        #[test]
        fn proptest_split_output_recovers_printed_text(printed in "(?s).{0,256}") {
            let marker = sentinel(&ExecutionId::new());
            let stdout = format!("{printed}\n{marker}\n\"done\"");
            match split_output(&stdout, &marker) {
                Some((output, encoded)) => {
                    proptest::prop_assert_eq!(output, printed.as_str());
                    proptest::prop_assert_eq!(encoded, "\"done\"");
                }
                None => proptest::prop_assert!(false, "sentinel must be found"),
            }
        }
    }
}
