//! The request handler every configured route dispatches to.

use std::sync::Arc;

use axum::extract::RawQuery;
use axum::http::{HeaderMap, Method};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use multimap::MultiMap;

use query_engine_execution::query as execution;
use query_engine_sql::sql;
use query_engine_translation::translation::params::ParameterResolver;
use query_engine_translation::translation::{mutation, query};

use crate::error::RequestError;
use crate::rendering;
use crate::state::RouteState;

/// Query parameter and header that override the transport method. The
/// parameter wins over the header.
const METHOD_OVERRIDE_PARAM: &str = "x-http-method-override";
const METHOD_OVERRIDE_HEADER: &str = "x-http-method-override";

pub async fn handle_request(
    Extension(route): Extension<Arc<RouteState>>,
    method: Method,
    headers: HeaderMap,
    RawQuery(raw_query): RawQuery,
) -> Response {
    match serve(&route, method, &headers, raw_query.as_deref().unwrap_or("")).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

async fn serve(
    route: &RouteState,
    method: Method,
    headers: &HeaderMap,
    raw_query: &str,
) -> Result<Response, RequestError> {
    let params: MultiMap<String, String> = url::form_urlencoded::parse(raw_query.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let method = effective_method(method, &params, headers);
    let resolver = ParameterResolver::new(&route.config, &params);
    let formats = resolver.resolve_formats();
    let table = &route.config.table;
    let strict = route.config.strict_filters;

    let plan = if method == Method::GET {
        let clauses = resolver.resolve_select_clauses()?;
        query::translate_select(table, &clauses, strict)?
    } else if method == Method::POST {
        let mut row = mutation::parse_values(&resolver.resolve("val"))?;
        if let Some(transform) = &route.transform {
            transform(&mut row);
        }
        mutation::translate_insert(table, &row)
    } else if method == Method::PUT {
        let row = mutation::parse_values(&resolver.resolve("val"))?;
        mutation::translate_update(table, &row, &resolver.resolve("where"), strict)?
    } else if method == Method::DELETE {
        mutation::translate_delete(table, &resolver.resolve("where"), strict)?
    } else {
        return Err(RequestError::MethodNotAllowed(method));
    };

    // Hand the execute step to the bounded worker pool so one slow query
    // cannot monopolize request acceptance.
    let permit = route
        .server
        .query_permits
        .acquire()
        .await
        .map_err(|_| RequestError::ShuttingDown)?;
    let pool = route
        .server
        .cache
        .get_or_connect(&route.cache_key, &route.config)
        .await?;
    let rendered = plan.query_sql(pool.dialect());
    let result = match &plan.statement {
        sql::ast::Statement::Select(_) => execution::execute_select(&pool, &rendered).await?,
        _ => execution::execute_mutation(&pool, &rendered).await?,
    };
    drop(permit);

    rendering::render(&result, &formats, &route.headers)
}

/// The effective method of a request, honoring the override parameter and
/// header. Unparsable override names leave the transport method in place.
fn effective_method(method: Method, params: &MultiMap<String, String>, headers: &HeaderMap) -> Method {
    let name = params
        .get(METHOD_OVERRIDE_PARAM)
        .map(String::as_str)
        .or_else(|| {
            headers
                .get(METHOD_OVERRIDE_HEADER)
                .and_then(|value| value.to_str().ok())
        });
    match name {
        Some(name) => Method::from_bytes(name.to_ascii_uppercase().as_bytes())
            .unwrap_or(method),
        None => method,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn override_parameter_wins_over_header() {
        let params: MultiMap<String, String> =
            [(METHOD_OVERRIDE_PARAM.to_string(), "put".to_string())]
                .into_iter()
                .collect();
        let mut headers = HeaderMap::new();
        headers.insert(METHOD_OVERRIDE_HEADER, HeaderValue::from_static("DELETE"));

        assert_eq!(
            effective_method(Method::POST, &params, &headers),
            Method::PUT
        );
        assert_eq!(
            effective_method(Method::POST, &MultiMap::new(), &headers),
            Method::DELETE
        );
        assert_eq!(
            effective_method(Method::POST, &MultiMap::new(), &HeaderMap::new()),
            Method::POST
        );
    }
}
