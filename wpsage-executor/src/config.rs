//! Execution limits and backend selection.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use wpsage_core::CoreError;

/// Default deadline for a single execution: 30 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Limits applied to every SQL or code execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ExecLimits {
    /// Wall-clock deadline per call.
    pub timeout: Duration,
}

impl ExecLimits {
    /// Limits with a custom deadline.
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ExecLimits {
    fn default() -> Self {
        Self { timeout: DEFAULT_TIMEOUT }
    }
}

/// Which backend serves `run-php`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Reject every payload.
    #[default]
    Disabled,
    /// Run payloads in a `php` child process.
    Php,
}

impl FromStr for BackendKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" | "none" | "" => Ok(Self::Disabled),
            "php" => Ok(Self::Php),
            other => Err(CoreError::InvalidConfig {
                key: "WPSAGE_CODE_BACKEND".to_owned(),
                reason: format!("unknown backend '{other}'; expected 'disabled' or 'php'"),
            }),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("disabled"),
            Self::Php => f.write_str("php"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_kind_parses_known_names() {
        assert_eq!("php".parse::<BackendKind>().ok(), Some(BackendKind::Php));
        assert_eq!(" PHP ".parse::<BackendKind>().ok(), Some(BackendKind::Php));
        assert_eq!("disabled".parse::<BackendKind>().ok(), Some(BackendKind::Disabled));
        assert_eq!("".parse::<BackendKind>().ok(), Some(BackendKind::Disabled));
    }

    #[test]
    fn backend_kind_rejects_unknown_names() {
        match "python".parse::<BackendKind>() {
            Err(CoreError::InvalidConfig { key, .. }) => assert_eq!(key, "WPSAGE_CODE_BACKEND"),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn default_limits_use_thirty_second_timeout() {
        assert_eq!(ExecLimits::default().timeout, Duration::from_secs(30));
        assert_eq!(BackendKind::default(), BackendKind::Disabled);
        assert_eq!(BackendKind::Php.to_string(), "php");
    }
}
