//! Parse filter expressions and translate them to WHERE predicates.

use query_engine_sql::sql;

use super::error::Error;
use super::values;

/// The operator characters that may start an operator. A column name must
/// not contain any of them.
const OPERATOR_CHARS: [char; 5] = ['=', '>', '<', '~', '!'];

/// Two-character operators, tried before their one-character prefixes so
/// `>=` never parses as `>` with a value starting in `=`.
const TWO_CHAR_OPERATORS: [(&str, Operator); 5] = [
    ("==", Operator::Eq),
    (">=", Operator::Gte),
    ("<=", Operator::Lte),
    ("!=", Operator::Neq),
    ("!~", Operator::NotLike),
];

/// One-character operators. A lone `!` is not an operator.
const ONE_CHAR_OPERATORS: [(&str, Operator); 4] = [
    ("=", Operator::Eq),
    (">", Operator::Gt),
    ("<", Operator::Lt),
    ("~", Operator::Like),
];

/// A comparison operator in a filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Case-insensitive substring match.
    Like,
    NotLike,
}

/// A parsed single filter test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: String,
}

/// Parse one `<column><operator><value>` expression. Returns `None` when the
/// expression does not match the grammar: no operator, an empty column or
/// value, or a lone `!`.
pub fn parse_condition(expr: &str) -> Option<Condition> {
    let operator_start = expr.find(|c| OPERATOR_CHARS.contains(&c))?;
    if operator_start == 0 {
        return None;
    }
    let column = &expr[..operator_start];
    let rest = &expr[operator_start..];

    let table = TWO_CHAR_OPERATORS.iter().chain(ONE_CHAR_OPERATORS.iter());
    for (symbol, operator) in table {
        if let Some(value) = rest.strip_prefix(symbol) {
            if value.is_empty() {
                return None;
            }
            return Some(Condition {
                column: column.to_string(),
                operator: *operator,
                value: value.to_string(),
            });
        }
    }
    None
}

/// Parse a whole `where` clause. Expressions that do not match the grammar
/// are dropped from the clause and counted, unless `strict` asks for the
/// request to fail instead.
pub fn parse_conditions(exprs: &[String], strict: bool) -> Result<Vec<Condition>, Error> {
    let mut conditions = Vec::with_capacity(exprs.len());
    let mut dropped = 0;
    for expr in exprs {
        match parse_condition(expr) {
            Some(condition) => conditions.push(condition),
            None if strict => return Err(Error::UnparsableFilter(expr.clone())),
            None => {
                tracing::debug!(expression = %expr, "dropping unparsable filter expression");
                dropped += 1;
            }
        }
    }
    if dropped > 0 {
        tracing::info!(dropped, "skipped filter expressions that did not parse");
    }
    Ok(conditions)
}

/// Translate parsed conditions to a single ANDed predicate.
pub fn translate(conditions: &[Condition]) -> sql::ast::Expression {
    sql::helpers::and_all(conditions.iter().map(to_expression).collect())
}

fn to_expression(condition: &Condition) -> sql::ast::Expression {
    let column = Box::new(sql::ast::Expression::ColumnReference(sql::ast::ColumnName(
        condition.column.clone(),
    )));
    let (operator, value) = match condition.operator {
        Operator::Eq => (
            sql::ast::BinaryOperator::Equals,
            values::literal(&condition.value),
        ),
        Operator::Neq => (
            sql::ast::BinaryOperator::NotEquals,
            values::literal(&condition.value),
        ),
        Operator::Gt => (
            sql::ast::BinaryOperator::GreaterThan,
            values::literal(&condition.value),
        ),
        Operator::Gte => (
            sql::ast::BinaryOperator::GreaterThanOrEqualTo,
            values::literal(&condition.value),
        ),
        Operator::Lt => (
            sql::ast::BinaryOperator::LessThan,
            values::literal(&condition.value),
        ),
        Operator::Lte => (
            sql::ast::BinaryOperator::LessThanOrEqualTo,
            values::literal(&condition.value),
        ),
        // Substring matches always bind strings, wrapped for "contains".
        Operator::Like => (
            sql::ast::BinaryOperator::CaseInsensitiveLike,
            sql::ast::Value::String(format!("%{}%", condition.value)),
        ),
        Operator::NotLike => (
            sql::ast::BinaryOperator::NotCaseInsensitiveLike,
            sql::ast::Value::String(format!("%{}%", condition.value)),
        ),
    };
    sql::ast::Expression::BinaryOperation {
        left: column,
        operator,
        right: Box::new(sql::ast::Expression::Value(value)),
    }
}
