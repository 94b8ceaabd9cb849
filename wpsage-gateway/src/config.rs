//! Gateway configuration read from `WPSAGE_*` environment variables.

use std::{path::PathBuf, time::Duration};

use wpsage_core::{CoreError, SqlPolicy};
use wpsage_executor::{BackendKind, ExecLimits};

/// Runtime configuration for the gateway binary.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct GatewayConfig {
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Path of the SQLite site database.
    pub database: PathBuf,
    /// Key to store under `wpsage_api_key` at startup, if any.
    pub api_key: Option<String>,
    /// Whether an empty stored key authorizes empty-key requests.
    pub allow_empty_key: bool,
    /// SQL operation whitelist.
    pub sql_policy: SqlPolicy,
    /// Backend serving `run-php`.
    pub code_backend: BackendKind,
    /// Interpreter used by the PHP backend.
    pub php_binary: PathBuf,
    /// Deadline applied to SQL and code execution.
    pub limits: ExecLimits,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3456".to_owned(),
            database: PathBuf::from("wpsage.db"),
            api_key: None,
            allow_empty_key: false,
            sql_policy: SqlPolicy::restricted(),
            code_backend: BackendKind::Disabled,
            php_binary: PathBuf::from("php"),
            limits: ExecLimits::default(),
        }
    }
}

impl GatewayConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] if a variable is set to a value
    /// that cannot be parsed.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset variables.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] if a value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(addr) = lookup("WPSAGE_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Some(path) = lookup("WPSAGE_DATABASE") {
            config.database = PathBuf::from(path);
        }
        config.api_key = lookup("WPSAGE_API_KEY");
        if let Some(raw) = lookup("WPSAGE_ALLOW_EMPTY_KEY") {
            config.allow_empty_key = parse_bool("WPSAGE_ALLOW_EMPTY_KEY", &raw)?;
        }
        if let Some(raw) = lookup("WPSAGE_SQL_WHITELIST") {
            config.sql_policy = SqlPolicy {
                whitelist_enabled: parse_bool("WPSAGE_SQL_WHITELIST", &raw)?,
            };
        }
        if let Some(raw) = lookup("WPSAGE_CODE_BACKEND") {
            config.code_backend = raw.parse()?;
        }
        if let Some(path) = lookup("WPSAGE_PHP_BINARY") {
            config.php_binary = PathBuf::from(path);
        }
        if let Some(raw) = lookup("WPSAGE_EXEC_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|e| CoreError::InvalidConfig {
                key: "WPSAGE_EXEC_TIMEOUT_SECS".to_owned(),
                reason: format!("{e}"),
            })?;
            if secs == 0 {
                return Err(CoreError::InvalidConfig {
                    key: "WPSAGE_EXEC_TIMEOUT_SECS".to_owned(),
                    reason: "must be at least 1".to_owned(),
                });
            }
            config.limits = ExecLimits::with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, CoreError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CoreError::InvalidConfig {
            key: key.to_owned(),
            reason: format!("expected true or false, got '{other}'"),
        }),
    }
}
