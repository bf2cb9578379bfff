//! Execute rendered statements against the database.

use sqlx::{Column, Row as _};

use query_engine_sql::sql::string::{Param, SQL};

use crate::error::Error;
use crate::pool::Pool;
use crate::rows::{Row, TabularResult};

/// Run a select and materialize every row.
pub async fn execute_select(pool: &Pool, sql: &SQL) -> Result<TabularResult, Error> {
    tracing::debug!(sql = %sql.sql, "executing select");
    let rows = match pool {
        Pool::Postgres(pool) => {
            let mut query = sqlx::query(&sql.sql);
            for param in &sql.params {
                query = match param {
                    Param::String(s) => query.bind(s),
                    Param::Int(i) => query.bind(i),
                    Param::Float(f) => query.bind(f),
                    Param::Bool(b) => query.bind(b),
                };
            }
            query
                .fetch_all(pool)
                .await
                .map_err(Error::Query)?
                .iter()
                .map(decode_postgres_row)
                .collect()
        }
        Pool::Sqlite(pool) => {
            let mut query = sqlx::query(&sql.sql);
            for param in &sql.params {
                query = match param {
                    Param::String(s) => query.bind(s),
                    Param::Int(i) => query.bind(i),
                    Param::Float(f) => query.bind(f),
                    Param::Bool(b) => query.bind(b),
                };
            }
            query
                .fetch_all(pool)
                .await
                .map_err(Error::Query)?
                .iter()
                .map(decode_sqlite_row)
                .collect()
        }
    };
    Ok(TabularResult { rows })
}

/// Run a mutation. The result is always empty; a response is still rendered
/// from it.
pub async fn execute_mutation(pool: &Pool, sql: &SQL) -> Result<TabularResult, Error> {
    tracing::debug!(sql = %sql.sql, "executing mutation");
    let rows_affected = match pool {
        Pool::Postgres(pool) => {
            let mut query = sqlx::query(&sql.sql);
            for param in &sql.params {
                query = match param {
                    Param::String(s) => query.bind(s),
                    Param::Int(i) => query.bind(i),
                    Param::Float(f) => query.bind(f),
                    Param::Bool(b) => query.bind(b),
                };
            }
            query.execute(pool).await.map_err(Error::Query)?.rows_affected()
        }
        Pool::Sqlite(pool) => {
            let mut query = sqlx::query(&sql.sql);
            for param in &sql.params {
                query = match param {
                    Param::String(s) => query.bind(s),
                    Param::Int(i) => query.bind(i),
                    Param::Float(f) => query.bind(f),
                    Param::Bool(b) => query.bind(b),
                };
            }
            query.execute(pool).await.map_err(Error::Query)?.rows_affected()
        }
    };
    tracing::debug!(rows_affected, "mutation complete");
    Ok(TabularResult::empty())
}

fn decode_postgres_row(row: &sqlx::postgres::PgRow) -> Row {
    let mut out = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
            int_value(v)
        } else if let Ok(v) = row.try_get::<Option<i32>, _>(index) {
            int_value(v.map(i64::from))
        } else if let Ok(v) = row.try_get::<Option<i16>, _>(index) {
            int_value(v.map(i64::from))
        } else if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
            float_value(v)
        } else if let Ok(v) = row.try_get::<Option<f32>, _>(index) {
            float_value(v.map(f64::from))
        } else if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
            v.map_or(serde_json::Value::Null, serde_json::Value::Bool)
        } else if let Ok(v) = row.try_get::<Option<String>, _>(index) {
            v.map_or(serde_json::Value::Null, serde_json::Value::String)
        } else {
            tracing::warn!(column = column.name(), "could not decode column value");
            serde_json::Value::Null
        };
        out.insert(column.name().to_string(), value);
    }
    out
}

fn decode_sqlite_row(row: &sqlx::sqlite::SqliteRow) -> Row {
    let mut out = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
            int_value(v)
        } else if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
            float_value(v)
        } else if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
            v.map_or(serde_json::Value::Null, serde_json::Value::Bool)
        } else if let Ok(v) = row.try_get::<Option<String>, _>(index) {
            v.map_or(serde_json::Value::Null, serde_json::Value::String)
        } else {
            tracing::warn!(column = column.name(), "could not decode column value");
            serde_json::Value::Null
        };
        out.insert(column.name().to_string(), value);
    }
    out
}

fn int_value(value: Option<i64>) -> serde_json::Value {
    value.map_or(serde_json::Value::Null, |i| {
        serde_json::Value::Number(i.into())
    })
}

fn float_value(value: Option<f64>) -> serde_json::Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map_or(serde_json::Value::Null, serde_json::Value::Number)
}
