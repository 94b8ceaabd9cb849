//! SQL operation whitelist.
//!
//! When enabled, only statements whose first keyword is one of
//! [`ALLOWED_OPERATIONS`] may run. When disabled, every statement is passed
//! through to the data store, including DML and DDL.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Leading keywords accepted while the whitelist is enabled.
pub const ALLOWED_OPERATIONS: [&str; 4] = ["SELECT", "SHOW", "DESCRIBE", "DESC"];

/// Policy applied to every `run-sql` request before it reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlPolicy {
    /// Reject statements outside [`ALLOWED_OPERATIONS`].
    pub whitelist_enabled: bool,
}

impl SqlPolicy {
    /// Policy that only lets read-only statements through.
    #[must_use]
    pub const fn restricted() -> Self {
        Self { whitelist_enabled: true }
    }

    /// Policy that lets any statement through.
    #[must_use]
    pub const fn permissive() -> Self {
        Self { whitelist_enabled: false }
    }

    /// Check a statement against the policy.
    ///
    /// # Errors
    /// Returns [`CoreError::ForbiddenOperation`] if the whitelist is enabled and
    /// the statement's leading keyword is not allowed.
    pub fn check(&self, query: &str) -> Result<(), CoreError> {
        if !self.whitelist_enabled {
            return Ok(());
        }
        let keyword = leading_keyword(query);
        if ALLOWED_OPERATIONS.contains(&keyword.as_str()) {
            Ok(())
        } else {
            Err(CoreError::ForbiddenOperation { keyword })
        }
    }
}

impl Default for SqlPolicy {
    fn default() -> Self {
        Self::restricted()
    }
}

/// Upper-cased first word of `query`, skipping leading whitespace.
///
/// A word ends at the first character that is not alphanumeric or `_`, so
/// `select*from t` yields `SELECT`.
#[must_use]
pub fn leading_keyword(query: &str) -> String {
    query
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restricted_policy_accepts_read_statements() {
        let policy = SqlPolicy::restricted();
        for query in ["SELECT 1", "  select * from posts", "SHOW TABLES", "describe t", "DESC t"] {
            assert!(policy.check(query).is_ok(), "'{query}' should be allowed");
        }
    }

    #[test]
    fn restricted_policy_rejects_mutations() {
        let policy = SqlPolicy::restricted();
        for query in ["DELETE FROM posts", "drop table options", "UPDATE t SET a = 1", "", "SELECTED"] {
            match policy.check(query) {
                Err(CoreError::ForbiddenOperation { .. }) => {}
                other => panic!("'{query}' should be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn permissive_policy_accepts_everything() {
        let policy = SqlPolicy::permissive();
        assert!(policy.check("DROP TABLE posts").is_ok());
        assert!(policy.check("").is_ok());
    }

    #[test]
    fn default_policy_is_restricted() {
        assert_eq!(SqlPolicy::default(), SqlPolicy::restricted());
    }

    #[test]
    fn leading_keyword_stops_at_punctuation() {
        assert_eq!(leading_keyword("select*from t"), "SELECT");
        assert_eq!(leading_keyword("\n\tDesc posts"), "DESC");
        assert_eq!(leading_keyword("(SELECT 1)"), "");
    }

    proptest::proptest! {
        #[test]
        fn proptest_whitelist_ignores_case_and_leading_whitespace(
            keyword in proptest::sample::select(ALLOWED_OPERATIONS.to_vec()),
            pad in "[ \t\n]{0,8}",
            rest in "[ a-z0-9*,]{0,32}",
            upper in proptest::prelude::any::<bool>(),
        ) {
            let keyword = if upper { keyword.to_owned() } else { keyword.to_lowercase() };
            let query = format!("{pad}{keyword} {rest}");
            proptest::prop_assert!(SqlPolicy::restricted().check(&query).is_ok());
        }

        #[test]
        fn proptest_rejection_reports_upper_cased_keyword(word in "[a-z]{1,12}") {
            proptest::prop_assume!(!ALLOWED_OPERATIONS.contains(&word.to_uppercase().as_str()));
            match SqlPolicy::restricted().check(&format!("{word} x")) {
                Err(CoreError::ForbiddenOperation { keyword }) => {
                    proptest::prop_assert_eq!(keyword, word.to_uppercase());
                }
                other => proptest::prop_assert!(false, "expected rejection, got {:?}", other),
            }
        }
    }
}
