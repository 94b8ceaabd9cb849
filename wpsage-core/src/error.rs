/// Errors produced by the `wpsage-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A SQL statement was rejected by the operation whitelist.
    #[error("Only SELECT, SHOW, DESCRIBE, and DESC operations are allowed")]
    ForbiddenOperation {
        /// The leading keyword that was rejected, upper-cased.
        keyword: String,
    },

    /// A configuration value could not be parsed.
    #[error("invalid configuration for '{key}': {reason}")]
    InvalidConfig { key: String, reason: String },
}
