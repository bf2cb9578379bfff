//! Resolve request parameters against configured overrides and defaults.

use multimap::MultiMap;

use datarest_configuration::RouteConfig;

use super::error::Error;

/// Limit applied when neither the request nor the configuration bounds the
/// query. Unbounded reads are never the default.
pub const DEFAULT_LIMIT: u64 = 100;

/// Resolves clause values for one request with strict precedence: configured
/// override, then request values, then configured default, then a caller
/// fallback. The first non-empty source wins verbatim; sources are never
/// merged. Overrides beating the request is the point: they are a
/// consistency guarantee the caller cannot undo.
pub struct ParameterResolver<'a> {
    config: &'a RouteConfig,
    request: &'a MultiMap<String, String>,
}

/// The final, precedence-merged clause values for one select request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedClauses {
    pub selects: Vec<String>,
    pub wheres: Vec<String>,
    pub groups: Vec<String>,
    pub aggs: Vec<String>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub sorts: Vec<String>,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(config: &'a RouteConfig, request: &'a MultiMap<String, String>) -> Self {
        ParameterResolver { config, request }
    }

    /// Resolve a clause, yielding the empty list when no source supplies it.
    pub fn resolve(&self, clause: &str) -> Vec<String> {
        self.resolve_or(clause, &[])
    }

    /// Resolve a clause with a caller-supplied fallback.
    pub fn resolve_or(&self, clause: &str, fallback: &[&str]) -> Vec<String> {
        if let Some(values) = non_empty(self.config.overrides.get(clause)) {
            return values.clone();
        }
        if let Some(values) = non_empty(self.request.get_vec(clause)) {
            return values.clone();
        }
        if let Some(values) = non_empty(self.config.defaults.get(clause)) {
            return values.clone();
        }
        fallback.iter().map(|s| (*s).to_string()).collect()
    }

    /// Resolve a numeric clause such as `offset` or `limit`.
    pub fn resolve_number(&self, clause: &'static str) -> Result<Option<u64>, Error> {
        match self.resolve(clause).first() {
            None => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| Error::InvalidClauseNumber {
                    clause,
                    value: value.clone(),
                }),
        }
    }

    /// Resolve everything a select query consumes.
    pub fn resolve_select_clauses(&self) -> Result<ResolvedClauses, Error> {
        Ok(ResolvedClauses {
            selects: self.resolve("select"),
            wheres: self.resolve("where"),
            groups: self.resolve("groupby"),
            aggs: self.resolve("agg"),
            offset: self.resolve_number("offset")?,
            limit: Some(self.resolve_number("limit")?.unwrap_or(DEFAULT_LIMIT)),
            sorts: self.resolve("sort"),
        })
    }

    /// Resolve the output format tokens, defaulting to json.
    pub fn resolve_formats(&self) -> Vec<String> {
        self.resolve_or("format", &["json"])
    }
}

fn non_empty(values: Option<&Vec<String>>) -> Option<&Vec<String>> {
    values.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use datarest_configuration::{make_runtime_config, ClauseValue, ParsedRouteConfig};
    use std::collections::BTreeMap;

    fn config(
        query: BTreeMap<String, ClauseValue>,
        default: BTreeMap<String, ClauseValue>,
    ) -> RouteConfig {
        make_runtime_config(ParsedRouteConfig {
            backend: "sqlite".to_string(),
            url: "flags.db".to_string(),
            table: "flags".to_string(),
            parameters: BTreeMap::new(),
            query,
            default,
            headers: BTreeMap::new(),
            posttransform: None,
            strict_filters: false,
        })
        .unwrap()
    }

    fn request(pairs: &[(&str, &str)]) -> MultiMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn override_wins_over_request_verbatim() {
        let config = config(
            BTreeMap::from([(
                "where".to_string(),
                ClauseValue::String("continent=Europe".to_string()),
            )]),
            BTreeMap::new(),
        );
        let request = request(&[("where", "continent=Asia"), ("where", "c1>10")]);
        let resolver = ParameterResolver::new(&config, &request);
        assert_eq!(resolver.resolve("where"), vec!["continent=Europe"]);
    }

    #[test]
    fn request_wins_over_default() {
        let config = config(
            BTreeMap::new(),
            BTreeMap::from([("limit".to_string(), ClauseValue::Integer(10))]),
        );
        let request = request(&[("limit", "25")]);
        let resolver = ParameterResolver::new(&config, &request);
        assert_eq!(resolver.resolve_number("limit").unwrap(), Some(25));
    }

    #[test]
    fn default_applies_when_request_is_silent() {
        let config = config(
            BTreeMap::new(),
            BTreeMap::from([(
                "sort".to_string(),
                ClauseValue::String("name:desc".to_string()),
            )]),
        );
        let request = request(&[]);
        let resolver = ParameterResolver::new(&config, &request);
        assert_eq!(resolver.resolve("sort"), vec!["name:desc"]);
    }

    #[test]
    fn fallback_applies_last() {
        let config = config(BTreeMap::new(), BTreeMap::new());
        let request = request(&[]);
        let resolver = ParameterResolver::new(&config, &request);
        assert_eq!(resolver.resolve_formats(), vec!["json"]);
        let clauses = resolver.resolve_select_clauses().unwrap();
        assert_eq!(clauses.limit, Some(DEFAULT_LIMIT));
        assert_eq!(clauses.offset, None);
    }

    #[test]
    fn non_numeric_limit_is_a_validation_error() {
        let config = config(BTreeMap::new(), BTreeMap::new());
        let request = request(&[("limit", "lots")]);
        let resolver = ParameterResolver::new(&config, &request);
        assert_eq!(
            resolver.resolve_number("limit"),
            Err(Error::InvalidClauseNumber {
                clause: "limit",
                value: "lots".to_string()
            })
        );
    }
}
