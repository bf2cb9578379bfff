//! Translate resolved clauses to a select execution plan.

use query_engine_sql::sql;
use query_engine_sql::sql::string::{Dialect, SQL};

use super::aggregates;
use super::error::Error;
use super::filtering;
use super::params::ResolvedClauses;
use super::sorting;

/// A statement ready to be rendered for a dialect and executed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    pub statement: sql::ast::Statement,
}

impl ExecutionPlan {
    /// Render the plan's SQL in the given dialect.
    pub fn query_sql(&self, dialect: Dialect) -> SQL {
        sql::helpers::statement_to_sql(&self.statement, dialect)
    }
}

/// Build a select plan from the resolved clauses of one request.
///
/// When both `groupby` and `agg` are present the query is grouped: the
/// projection is the group columns plus one aliased aggregate per `agg`
/// expression, and
/// a non-empty `select` then filters that projection by name. The selection
/// acts after aggregation, so a request can narrow which aggregates come
/// back without re-stating the aggregation.
pub fn translate_select(
    table: &str,
    clauses: &ResolvedClauses,
    strict_filters: bool,
) -> Result<ExecutionPlan, Error> {
    let conditions = filtering::parse_conditions(&clauses.wheres, strict_filters)?;
    let where_ = sql::ast::Where(filtering::translate(&conditions));

    let (select_list, group_by) = if !clauses.groups.is_empty() && !clauses.aggs.is_empty() {
        let mut projection: Vec<(sql::ast::ColumnAlias, sql::ast::Expression)> = clauses
            .groups
            .iter()
            .map(|group| column_entry(group))
            .collect();
        for spec in aggregates::parse_aggregates(&clauses.aggs) {
            projection.push(aggregates::translate(&spec)?);
        }
        if !clauses.selects.is_empty() {
            projection.retain(|(alias, _)| clauses.selects.contains(&alias.name));
        }
        let group_by = sql::ast::GroupBy {
            elements: clauses
                .groups
                .iter()
                .map(|group| sql::ast::ColumnName(group.clone()))
                .collect(),
        };
        (sql::ast::SelectList::SelectList(projection), group_by)
    } else if clauses.selects.is_empty() {
        (sql::ast::SelectList::SelectStar, sql::helpers::empty_group_by())
    } else {
        let projection = clauses
            .selects
            .iter()
            .map(|column| column_entry(column))
            .collect();
        (
            sql::ast::SelectList::SelectList(projection),
            sql::helpers::empty_group_by(),
        )
    };

    let select = sql::ast::Select {
        select_list,
        from: sql::ast::From::Table {
            name: sql::ast::TableName(table.to_string()),
        },
        where_,
        group_by,
        order_by: sorting::translate(&clauses.sorts),
        limit: sql::ast::Limit {
            limit: clauses.limit,
            offset: clauses.offset,
        },
    };

    Ok(ExecutionPlan {
        statement: sql::ast::Statement::Select(select),
    })
}

fn column_entry(name: &str) -> (sql::ast::ColumnAlias, sql::ast::Expression) {
    sql::helpers::make_column(
        sql::ast::ColumnName(name.to_string()),
        sql::helpers::make_column_alias(name.to_string()),
    )
}
