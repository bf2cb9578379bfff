//! Parse sort expressions and translate them to an ORDER BY clause.

use query_engine_sql::sql;

/// A parsed `column[:direction]` pair. Missing or unrecognized directions
/// sort ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub descending: bool,
}

/// Parse one sort expression, splitting on the first colon.
pub fn parse_sort(expr: &str) -> SortSpec {
    match expr.split_once(':') {
        Some((column, direction)) => SortSpec {
            column: column.to_string(),
            descending: direction == "desc",
        },
        None => SortSpec {
            column: expr.to_string(),
            descending: false,
        },
    }
}

/// Translate a `sort` clause to an ORDER BY, in the given order.
pub fn translate(exprs: &[String]) -> sql::ast::OrderBy {
    sql::ast::OrderBy {
        elements: exprs
            .iter()
            .map(|expr| {
                let spec = parse_sort(expr);
                sql::ast::OrderByElement {
                    target: sql::ast::ColumnName(spec.column),
                    direction: if spec.descending {
                        sql::ast::OrderByDirection::Desc
                    } else {
                        sql::ast::OrderByDirection::Asc
                    },
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_defaults_to_ascending() {
        assert_eq!(
            parse_sort("name"),
            SortSpec {
                column: "name".to_string(),
                descending: false
            }
        );
        assert_eq!(
            parse_sort("name:desc"),
            SortSpec {
                column: "name".to_string(),
                descending: true
            }
        );
        // Unrecognized directions are treated as ascending.
        assert_eq!(
            parse_sort("name:down"),
            SortSpec {
                column: "name".to_string(),
                descending: false
            }
        );
    }
}
