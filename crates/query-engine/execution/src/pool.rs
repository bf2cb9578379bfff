//! Connection pools for the supported backends.

use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use datarest_configuration::{BackendKind, RouteConfig};

use query_engine_sql::sql::string::Dialect;

use crate::error::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// A live backend connection pool. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub enum Pool {
    Postgres(sqlx::PgPool),
    Sqlite(sqlx::SqlitePool),
}

impl Pool {
    /// The dialect statements must be rendered in for this pool.
    pub fn dialect(&self) -> Dialect {
        match self {
            Pool::Postgres(_) => Dialect::Postgres,
            Pool::Sqlite(_) => Dialect::Sqlite,
        }
    }

    /// Open a pool for a route's backend. Driver parameters from the
    /// configuration are applied here; unknown ones are logged and skipped.
    pub async fn connect(config: &RouteConfig) -> Result<Pool, Error> {
        for key in config.parameters.keys() {
            if key != "max_connections" && key != "create_if_missing" {
                tracing::warn!(parameter = %key, "ignoring unknown driver parameter");
            }
        }

        let max_connections = parameter(config, "max_connections")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        match config.backend {
            BackendKind::Postgres => {
                let options =
                    PgConnectOptions::from_str(&config.url).map_err(Error::Connect)?;
                let pool = PgPoolOptions::new()
                    .max_connections(max_connections)
                    .connect_with(options)
                    .await
                    .map_err(Error::Connect)?;
                Ok(Pool::Postgres(pool))
            }
            BackendKind::Sqlite => {
                // The target may be a plain file path or a sqlite: URI.
                let options = if config.url.starts_with("sqlite:") {
                    SqliteConnectOptions::from_str(&config.url).map_err(Error::Connect)?
                } else {
                    SqliteConnectOptions::new().filename(&config.url)
                };
                let options = options.create_if_missing(
                    parameter(config, "create_if_missing") == Some("true"),
                );
                let pool = SqlitePoolOptions::new()
                    .max_connections(max_connections)
                    .connect_with(options)
                    .await
                    .map_err(Error::Connect)?;
                Ok(Pool::Sqlite(pool))
            }
        }
    }
}

fn parameter<'a>(config: &'a RouteConfig, name: &str) -> Option<&'a str> {
    config.parameters.get(name).map(String::as_str)
}
