//! Helpers for building sql::ast types in certain shapes and patterns.

use super::ast::*;
use super::string::{Dialect, SQL};

// Empty clauses //

/// An empty `WHERE` clause.
pub fn empty_where() -> Expression {
    Expression::Value(Value::Bool(true))
}

/// An empty `GROUP BY` clause.
pub fn empty_group_by() -> GroupBy {
    GroupBy { elements: vec![] }
}

/// An empty `ORDER BY` clause.
pub fn empty_order_by() -> OrderBy {
    OrderBy { elements: vec![] }
}

/// Empty `LIMIT` and `OFFSET` clauses.
pub fn empty_limit() -> Limit {
    Limit {
        limit: None,
        offset: None,
    }
}

/// A `true` expression.
pub fn true_expr() -> Expression {
    Expression::Value(Value::Bool(true))
}

// Aliasing //

/// Create column aliases using this function so we build everything in one place.
pub fn make_column_alias(name: String) -> ColumnAlias {
    ColumnAlias { name }
}

/// Generate an aliased column expression for a select list.
pub fn make_column(name: ColumnName, alias: ColumnAlias) -> (ColumnAlias, Expression) {
    (alias, Expression::ColumnReference(name))
}

// SELECTs //

/// Build a simple select with a select list and the rest empty.
pub fn simple_select(select_list: Vec<(ColumnAlias, Expression)>, from: From) -> Select {
    Select {
        select_list: SelectList::SelectList(select_list),
        from,
        where_: Where(empty_where()),
        group_by: empty_group_by(),
        order_by: empty_order_by(),
        limit: empty_limit(),
    }
}

/// Build a simple select *
pub fn star_select(from: From) -> Select {
    Select {
        select_list: SelectList::SelectStar,
        from,
        where_: Where(empty_where()),
        group_by: empty_group_by(),
        order_by: empty_order_by(),
        limit: empty_limit(),
    }
}

/// Fold a sequence of expressions into one with AND, `true` when empty.
pub fn and_all(expressions: Vec<Expression>) -> Expression {
    expressions
        .into_iter()
        .reduce(|left, right| Expression::And {
            left: Box::new(left),
            right: Box::new(right),
        })
        .unwrap_or_else(empty_where)
}

/// Render a statement in the given dialect.
pub fn statement_to_sql(statement: &Statement, dialect: Dialect) -> SQL {
    let mut sql = SQL::new(dialect);
    statement.to_sql(&mut sql);
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::string::Param;

    #[test]
    fn star_select_renders_without_empty_clauses() {
        let select = star_select(From::Table {
            name: TableName("flags".to_string()),
        });
        let sql = statement_to_sql(&Statement::Select(select), Dialect::Postgres);
        assert_eq!(sql.sql, "SELECT * FROM \"flags\"");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn and_all_folds_left_to_right() {
        let expr = and_all(vec![
            Expression::ColumnReference(ColumnName("a".to_string())),
            Expression::ColumnReference(ColumnName("b".to_string())),
            Expression::ColumnReference(ColumnName("c".to_string())),
        ]);
        let mut sql = SQL::new(Dialect::Postgres);
        expr.to_sql(&mut sql);
        assert_eq!(sql.sql, "((\"a\" AND \"b\") AND \"c\")");
    }

    #[test]
    fn update_renders_set_and_where() {
        let update = Update {
            table: TableName("flags".to_string()),
            set: vec![(
                ColumnName("name".to_string()),
                Expression::Value(Value::String("IN".to_string())),
            )],
            where_: Where(Expression::BinaryOperation {
                left: Box::new(Expression::ColumnReference(ColumnName("id".to_string()))),
                operator: BinaryOperator::Equals,
                right: Box::new(Expression::Value(Value::Int8(3))),
            }),
        };
        let sql = statement_to_sql(&Statement::Update(update), Dialect::Postgres);
        assert_eq!(sql.sql, "UPDATE \"flags\" SET \"name\" = $1 WHERE (\"id\" = $2)");
        assert_eq!(
            sql.params,
            vec![Param::String("IN".to_string()), Param::Int(3)]
        );
    }
}
