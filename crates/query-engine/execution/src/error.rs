//! Errors raised while connecting to or querying the database.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not connect to the database: {0}")]
    Connect(sqlx::Error),

    #[error("the database rejected the query: {0}")]
    Query(sqlx::Error),
}

impl Error {
    /// Whether the database itself refused the statement, which points at
    /// the request (unknown column, type mismatch) rather than the service.
    pub fn is_rejected_query(&self) -> bool {
        matches!(self, Error::Query(sqlx::Error::Database(_)))
    }
}
