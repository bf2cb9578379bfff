//! Router setup: elaborate every configured route and wire it to the
//! shared request handler.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::routing::any;
use axum::{Extension, Router};

use datarest_configuration::{
    make_runtime_config, ConfigurationError, ParsedRouteConfig, RouteConfig,
};

use crate::routes;
use crate::state::{RouteState, ServerState};
use crate::transforms::TransformRegistry;

/// Build the router for a routes file. Any misconfigured route fails the
/// whole build, so a server never starts with a partially working surface.
pub fn build_router(
    routes: BTreeMap<String, ParsedRouteConfig>,
    transforms: &TransformRegistry,
    server: ServerState,
) -> Result<Router, ConfigurationError> {
    let mut router = Router::new();
    for (path, parsed) in routes {
        let config = make_runtime_config(parsed)?;
        let state = route_state(config, transforms, server.clone())?;
        tracing::info!(path = %path, table = %state.config.table, "configured route");
        router = router.route(
            &path,
            any(routes::handle_request).layer(Extension(Arc::new(state))),
        );
    }
    Ok(router)
}

fn route_state(
    config: RouteConfig,
    transforms: &TransformRegistry,
    server: ServerState,
) -> Result<RouteState, ConfigurationError> {
    let cache_key = config.cache_key()?;
    let headers = parse_headers(&config.headers)?;
    let transform = config
        .posttransform
        .as_deref()
        .map(|name| transforms.resolve(name))
        .transpose()?;
    Ok(RouteState {
        config,
        cache_key,
        headers,
        transform,
        server,
    })
}

/// Validate configured response headers once, at setup.
fn parse_headers(
    headers: &BTreeMap<String, String>,
) -> Result<Vec<(HeaderName, HeaderValue)>, ConfigurationError> {
    headers
        .iter()
        .map(|(name, value)| {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|_| ConfigurationError::InvalidHeader(name.clone()))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|_| ConfigurationError::InvalidHeader(value.clone()))?;
            Ok((name, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_header_names_fail_at_setup() {
        let headers = BTreeMap::from([("bad header".to_string(), "x".to_string())]);
        assert!(matches!(
            parse_headers(&headers),
            Err(ConfigurationError::InvalidHeader(name)) if name == "bad header"
        ));
    }

    #[test]
    fn valid_headers_parse() {
        let headers = BTreeMap::from([(
            "Content-Type".to_string(),
            "text/plain".to_string(),
        )]);
        let parsed = parse_headers(&headers).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].0.as_str(), "content-type");
    }
}
