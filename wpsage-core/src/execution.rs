use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One result row: column name to scalar value, in select-list order.
pub type QueryRow = IndexMap<String, Value>;

/// Rows returned by a SQL statement. Statements without a result set yield
/// an empty vector.
pub type QueryResult = Vec<QueryRow>;

/// Outcome of running a code payload through an execution backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ExecutionResult {
    /// Everything the payload wrote to standard output.
    pub output: String,
    /// The payload's return value, `null` when it returned nothing.
    pub return_value: Value,
}

impl ExecutionResult {
    /// Create a new execution result.
    #[must_use]
    pub fn new(output: impl Into<String>, return_value: Value) -> Self {
        Self { output: output.into(), return_value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_row_preserves_column_order() {
        let mut row = QueryRow::new();
        row.insert("zeta".to_owned(), Value::from(1));
        row.insert("alpha".to_owned(), Value::from(2));
        let json = match serde_json::to_string(&row) {
            Ok(s) => s,
            Err(e) => panic!("serialization failed: {e}"),
        };
        assert_eq!(json, r#"{"zeta":1,"alpha":2}"#);
    }

    #[test]
    fn execution_result_serializes_both_fields() {
        let result = ExecutionResult::new("hi", Value::from(42));
        let json = match serde_json::to_value(&result) {
            Ok(v) => v,
            Err(e) => panic!("serialization failed: {e}"),
        };
        assert_eq!(json, serde_json::json!({"output": "hi", "return_value": 42}));
    }
}
