//! Route configuration and its elaboration into a runtime form.
//!
//! A route is written in YAML as a `ParsedRouteConfig`. At server setup it is
//! elaborated into a `RouteConfig`: the backend kind is validated and the
//! configured override/default clause maps are normalized into plain lists of
//! expressions, so request handling never has to look at raw YAML shapes.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Clauses whose mapping values are joined into `key<delimiter>value`
/// expressions, with the delimiter to use.
const JOINED_CLAUSES: [(&str, &str); 3] = [("agg", ":"), ("sort", ":"), ("where", "")];

/// Clauses that only need column names, so mapping values are ignored.
const KEYS_ONLY_CLAUSES: [&str; 2] = ["select", "groupby"];

/// The backend a route executes against. Both speak SQL through the same
/// query pipeline and differ only in dialect and driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Postgres,
    Sqlite,
}

impl FromStr for BackendKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgres" => Ok(BackendKind::Postgres),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(ConfigurationError::UnsupportedBackend(other.to_string())),
        }
    }
}

/// A configured clause value, before normalization. Allows the common scalar
/// case to be written without list syntax.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ClauseValue {
    String(String),
    Integer(i64),
    List(Vec<String>),
    Mapping(BTreeMap<String, String>),
}

/// Route configuration as written in the routes file, just enough to
/// elaborate a full `RouteConfig`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParsedRouteConfig {
    /// Backend kind, validated during elaboration.
    pub backend: String,
    /// Connection URI or file path for the backend.
    pub url: String,
    /// Table served by this route.
    pub table: String,
    /// Extra driver parameters.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Fixed clause overrides. These always win over request parameters.
    #[serde(default)]
    pub query: BTreeMap<String, ClauseValue>,
    /// Clause defaults, used when neither an override nor the request
    /// supplies a value.
    #[serde(default)]
    pub default: BTreeMap<String, ClauseValue>,
    /// Response headers applied after format-driven headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Name of a registered post-insert transform.
    #[serde(default)]
    pub posttransform: Option<String>,
    /// When set, an unparsable filter expression fails the request instead
    /// of being dropped from the clause.
    #[serde(default)]
    pub strict_filters: bool,
}

/// Elaborated route configuration, shared by all requests to a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteConfig {
    pub backend: BackendKind,
    pub url: String,
    pub table: String,
    pub parameters: BTreeMap<String, String>,
    pub overrides: BTreeMap<String, Vec<String>>,
    pub defaults: BTreeMap<String, Vec<String>>,
    pub headers: BTreeMap<String, String>,
    pub posttransform: Option<String>,
    pub strict_filters: bool,
}

impl RouteConfig {
    /// A stable serialization of the whole configuration, used as the
    /// connection cache key: routes with identical backend settings share
    /// one connection pool.
    pub fn cache_key(&self) -> Result<String, ConfigurationError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Elaborate a parsed route into its runtime form.
pub fn make_runtime_config(parsed: ParsedRouteConfig) -> Result<RouteConfig, ConfigurationError> {
    let backend = BackendKind::from_str(&parsed.backend)?;
    let overrides = normalize_clause_map(parsed.query)?;
    let defaults = normalize_clause_map(parsed.default)?;
    Ok(RouteConfig {
        backend,
        url: parsed.url,
        table: parsed.table,
        parameters: parsed.parameters,
        overrides,
        defaults,
        headers: parsed.headers,
        posttransform: parsed.posttransform,
        strict_filters: parsed.strict_filters,
    })
}

/// Normalize configured clause values into lists of expression strings, the
/// shape request parameters arrive in.
fn normalize_clause_map(
    map: BTreeMap<String, ClauseValue>,
) -> Result<BTreeMap<String, Vec<String>>, ConfigurationError> {
    map.into_iter()
        .map(|(clause, value)| {
            let values = match value {
                ClauseValue::String(s) => vec![s],
                ClauseValue::Integer(i) => vec![i.to_string()],
                ClauseValue::List(items) => items,
                ClauseValue::Mapping(entries) => normalize_mapping(&clause, entries)?,
            };
            Ok((clause, values))
        })
        .collect()
}

fn normalize_mapping(
    clause: &str,
    entries: BTreeMap<String, String>,
) -> Result<Vec<String>, ConfigurationError> {
    if KEYS_ONLY_CLAUSES.contains(&clause) {
        return Ok(entries.into_keys().collect());
    }
    match JOINED_CLAUSES.iter().find(|(name, _)| *name == clause) {
        Some((_, delimiter)) => Ok(entries
            .into_iter()
            .map(|(key, value)| format!("{key}{delimiter}{value}"))
            .collect()),
        None => Err(ConfigurationError::MappingNotAllowed(clause.to_string())),
    }
}

/// Read a routes file: a YAML mapping of URL path to route configuration.
pub async fn parse_routes_file(
    path: impl AsRef<Path>,
) -> Result<BTreeMap<String, ParsedRouteConfig>, ConfigurationError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(ConfigurationError::ReadRoutesFile)?;
    Ok(serde_yaml::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(
        query: BTreeMap<String, ClauseValue>,
        default: BTreeMap<String, ClauseValue>,
    ) -> ParsedRouteConfig {
        ParsedRouteConfig {
            backend: "sqlite".to_string(),
            url: "flags.db".to_string(),
            table: "flags".to_string(),
            parameters: BTreeMap::new(),
            query,
            default,
            headers: BTreeMap::new(),
            posttransform: None,
            strict_filters: false,
        }
    }

    #[test]
    fn scalars_become_single_element_lists() {
        let config = make_runtime_config(parsed(
            BTreeMap::from([
                ("limit".to_string(), ClauseValue::Integer(10)),
                (
                    "format".to_string(),
                    ClauseValue::String("csv".to_string()),
                ),
            ]),
            BTreeMap::new(),
        ))
        .unwrap();
        assert_eq!(config.overrides["limit"], vec!["10"]);
        assert_eq!(config.overrides["format"], vec!["csv"]);
    }

    #[test]
    fn mappings_join_with_clause_delimiters() {
        let config = make_runtime_config(parsed(
            BTreeMap::from([
                (
                    "agg".to_string(),
                    ClauseValue::Mapping(BTreeMap::from([(
                        "total".to_string(),
                        "sum(amount)".to_string(),
                    )])),
                ),
                (
                    "where".to_string(),
                    ClauseValue::Mapping(BTreeMap::from([(
                        "region".to_string(),
                        "=west".to_string(),
                    )])),
                ),
                (
                    "select".to_string(),
                    ClauseValue::Mapping(BTreeMap::from([(
                        "region".to_string(),
                        "ignored".to_string(),
                    )])),
                ),
            ]),
            BTreeMap::new(),
        ))
        .unwrap();
        assert_eq!(config.overrides["agg"], vec!["total:sum(amount)"]);
        assert_eq!(config.overrides["where"], vec!["region=west"]);
        assert_eq!(config.overrides["select"], vec!["region"]);
    }

    #[test]
    fn mappings_on_other_clauses_are_rejected() {
        let result = make_runtime_config(parsed(
            BTreeMap::from([(
                "limit".to_string(),
                ClauseValue::Mapping(BTreeMap::from([("a".to_string(), "b".to_string())])),
            )]),
            BTreeMap::new(),
        ));
        assert!(matches!(
            result,
            Err(ConfigurationError::MappingNotAllowed(clause)) if clause == "limit"
        ));
    }

    #[test]
    fn unsupported_backend_kind_is_fatal() {
        let mut config = parsed(BTreeMap::new(), BTreeMap::new());
        config.backend = "blaze".to_string();
        assert!(matches!(
            make_runtime_config(config),
            Err(ConfigurationError::UnsupportedBackend(kind)) if kind == "blaze"
        ));
    }

    #[test]
    fn identical_configs_share_a_cache_key() {
        let a = make_runtime_config(parsed(BTreeMap::new(), BTreeMap::new())).unwrap();
        let b = make_runtime_config(parsed(BTreeMap::new(), BTreeMap::new())).unwrap();
        assert_eq!(a.cache_key().unwrap(), b.cache_key().unwrap());

        let mut c = parsed(BTreeMap::new(), BTreeMap::new());
        c.table = "countries".to_string();
        let c = make_runtime_config(c).unwrap();
        assert_ne!(a.cache_key().unwrap(), c.cache_key().unwrap());
    }
}
