//! Parse aggregate expressions and translate them to select-list entries.

use query_engine_sql::sql;

use super::error::Error;

/// A parsed `alias:function(column)` triple describing one computed output
/// column of a grouped query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSpec {
    pub alias: String,
    pub function: String,
    pub column: String,
}

/// Parse one aggregate expression. The function name must be letters only;
/// whether it names a supported aggregate is checked at translation time.
/// Returns `None` when the expression does not match the grammar.
pub fn parse_aggregate(expr: &str) -> Option<AggregateSpec> {
    let (alias, rest) = expr.split_once(':')?;
    let (function, rest) = rest.split_once('(')?;
    let column = rest.strip_suffix(')')?;
    if alias.is_empty()
        || function.is_empty()
        || !function.chars().all(|c| c.is_ascii_alphabetic())
        || column.is_empty()
        || column.contains(':')
    {
        return None;
    }
    Some(AggregateSpec {
        alias: alias.to_string(),
        function: function.to_string(),
        column: column.to_string(),
    })
}

/// Parse a whole `agg` clause, dropping expressions that do not match the
/// grammar.
pub fn parse_aggregates(exprs: &[String]) -> Vec<AggregateSpec> {
    exprs
        .iter()
        .filter_map(|expr| {
            let spec = parse_aggregate(expr);
            if spec.is_none() {
                tracing::debug!(expression = %expr, "dropping unparsable aggregate expression");
            }
            spec
        })
        .collect()
}

/// Translate a parsed aggregate to an aliased select-list expression.
/// `nunique` becomes a distinct count; everything else maps directly.
pub fn translate(
    spec: &AggregateSpec,
) -> Result<(sql::ast::ColumnAlias, sql::ast::Expression), Error> {
    let column = sql::ast::ColumnName(spec.column.clone());
    let expression = match spec.function.as_str() {
        "count" => sql::ast::Expression::Count(sql::ast::CountType::Simple(column)),
        "nunique" => sql::ast::Expression::Count(sql::ast::CountType::Distinct(column)),
        "min" | "max" | "sum" | "mean" => {
            let function = match spec.function.as_str() {
                "min" => sql::ast::Function::Min,
                "max" => sql::ast::Function::Max,
                "sum" => sql::ast::Function::Sum,
                _ => sql::ast::Function::Avg,
            };
            sql::ast::Expression::FunctionCall {
                function,
                args: vec![sql::ast::Expression::ColumnReference(column)],
            }
        }
        other => return Err(Error::UnsupportedAggregateFunction(other.to_string())),
    };
    Ok((
        sql::helpers::make_column_alias(spec.alias.clone()),
        expression,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_sql::sql::helpers::statement_to_sql;
    use query_engine_sql::sql::string::Dialect;

    #[test]
    fn parses_the_triple() {
        assert_eq!(
            parse_aggregate("total:sum(amount)"),
            Some(AggregateSpec {
                alias: "total".to_string(),
                function: "sum".to_string(),
                column: "amount".to_string(),
            })
        );
    }

    #[test]
    fn malformed_expressions_do_not_parse() {
        assert_eq!(parse_aggregate(":sum(amount)"), None);
        assert_eq!(parse_aggregate("total:sum"), None);
        assert_eq!(parse_aggregate("total:sum(amount"), None);
        assert_eq!(parse_aggregate("total:su2m(amount)"), None);
        assert_eq!(parse_aggregate("total:sum()"), None);
        assert_eq!(parse_aggregate("total:sum(a:b)"), None);
    }

    #[test]
    fn nunique_counts_distinct_values() {
        let spec = parse_aggregate("states:nunique(state)").unwrap();
        let (alias, expression) = translate(&spec).unwrap();
        assert_eq!(alias.name, "states");

        let select = sql::helpers::simple_select(
            vec![(alias, expression)],
            sql::ast::From::Table {
                name: sql::ast::TableName("flags".to_string()),
            },
        );
        let rendered = statement_to_sql(&sql::ast::Statement::Select(select), Dialect::Postgres);
        assert_eq!(
            rendered.sql,
            "SELECT COUNT(DISTINCT \"state\") AS \"states\" FROM \"flags\""
        );
    }

    #[test]
    fn unknown_functions_fail_translation() {
        let spec = parse_aggregate("m:median(amount)").unwrap();
        assert_eq!(
            translate(&spec),
            Err(Error::UnsupportedAggregateFunction("median".to_string()))
        );
    }
}
