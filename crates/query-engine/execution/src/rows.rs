//! The backend-agnostic tabular result passed to rendering.

use indexmap::IndexMap;

/// One result row: an ordered mapping of column name to scalar value.
pub type Row = IndexMap<String, serde_json::Value>;

/// An ordered sequence of rows with a uniform schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularResult {
    pub rows: Vec<Row>,
}

impl TabularResult {
    /// The result of a successful mutation: zero rows, schema undefined.
    pub fn empty() -> TabularResult {
        TabularResult { rows: vec![] }
    }

    /// Column names, taken from the first row.
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
