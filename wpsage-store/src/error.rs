//! Error types for the store crate.

/// Errors that can occur while reading or querying the site database.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// Error reported by SQLite. The message is what callers see in a
    /// `query_error` response.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// The connection mutex was poisoned by a panic in another thread.
    #[error("site database connection is unavailable: lock poisoned")]
    LockPoisoned,

    /// An option value could not be interpreted.
    #[error("option '{name}' is malformed: {reason}")]
    InvalidOption { name: String, reason: String },
}
