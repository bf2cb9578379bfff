//! Translate value and filter clauses to mutation execution plans.

use indexmap::IndexMap;

use query_engine_sql::sql;

use super::error::Error;
use super::filtering;
use super::query::ExecutionPlan;
use super::values;

/// Parse repeated `key=value` expressions into an ordered row map, splitting
/// once on the first `=`. Later duplicates win.
pub fn parse_values(vals: &[String]) -> Result<IndexMap<String, String>, Error> {
    vals.iter()
        .map(|expr| {
            expr.split_once('=')
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| Error::MalformedValueExpression(expr.clone()))
        })
        .collect()
}

/// Build a single-row insert plan. An empty row map inserts a row of
/// defaults.
pub fn translate_insert(table: &str, row: &IndexMap<String, String>) -> ExecutionPlan {
    let (columns, row_values) = row
        .iter()
        .map(|(column, value)| {
            (
                sql::ast::ColumnName(column.clone()),
                sql::ast::Expression::Value(values::literal(value)),
            )
        })
        .unzip();
    ExecutionPlan {
        statement: sql::ast::Statement::Insert(sql::ast::Insert {
            table: sql::ast::TableName(table.to_string()),
            columns,
            values: row_values,
        }),
    }
}

/// Build a filtered update plan. Requires a non-empty row map and a
/// non-empty `where` clause: an unconditional update is never implied.
pub fn translate_update(
    table: &str,
    row: &IndexMap<String, String>,
    wheres: &[String],
    strict_filters: bool,
) -> Result<ExecutionPlan, Error> {
    if row.is_empty() {
        return Err(Error::MissingRequiredClause {
            clause: "val",
            operation: "update",
        });
    }
    if wheres.is_empty() {
        return Err(Error::MissingRequiredClause {
            clause: "where",
            operation: "update",
        });
    }
    let conditions = filtering::parse_conditions(wheres, strict_filters)?;
    let set = row
        .iter()
        .map(|(column, value)| {
            (
                sql::ast::ColumnName(column.clone()),
                sql::ast::Expression::Value(values::literal(value)),
            )
        })
        .collect();
    Ok(ExecutionPlan {
        statement: sql::ast::Statement::Update(sql::ast::Update {
            table: sql::ast::TableName(table.to_string()),
            set,
            where_: sql::ast::Where(filtering::translate(&conditions)),
        }),
    })
}

/// Build a filtered delete plan. Requires a non-empty `where` clause.
pub fn translate_delete(
    table: &str,
    wheres: &[String],
    strict_filters: bool,
) -> Result<ExecutionPlan, Error> {
    if wheres.is_empty() {
        return Err(Error::MissingRequiredClause {
            clause: "where",
            operation: "delete",
        });
    }
    let conditions = filtering::parse_conditions(wheres, strict_filters)?;
    Ok(ExecutionPlan {
        statement: sql::ast::Statement::Delete(sql::ast::Delete {
            table: sql::ast::TableName(table.to_string()),
            where_: sql::ast::Where(filtering::translate(&conditions)),
        }),
    })
}
