//! Translate raw string values to SQL literals.

use query_engine_sql::sql;

/// Request values arrive as strings. Values that read as numbers are bound
/// as numbers so comparisons and inserts against numeric columns work on
/// backends with strict parameter typing.
pub fn literal(raw: &str) -> sql::ast::Value {
    if let Ok(int) = raw.parse::<i64>() {
        sql::ast::Value::Int8(int)
    } else if let Ok(float) = raw.parse::<f64>() {
        sql::ast::Value::Float8(float)
    } else {
        sql::ast::Value::String(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_sql::sql::ast::Value;

    #[test]
    fn numbers_are_sniffed() {
        assert_eq!(literal("30"), Value::Int8(30));
        assert_eq!(literal("-4"), Value::Int8(-4));
        assert_eq!(literal("2.5"), Value::Float8(2.5));
        assert_eq!(literal("30x"), Value::String("30x".to_string()));
        assert_eq!(literal(""), Value::String(String::new()));
    }
}
