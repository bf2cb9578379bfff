//! Transient state used by the server.
//!
//! This is initialized on startup and shared by all routes.

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use tokio::sync::Semaphore;

use datarest_configuration::RouteConfig;
use query_engine_execution::ConnectionCache;

use crate::transforms::PostTransform;

/// State shared by every route: the connection cache and the worker permits
/// that bound how many compiled queries execute at once.
#[derive(Clone)]
pub struct ServerState {
    pub cache: Arc<ConnectionCache>,
    pub query_permits: Arc<Semaphore>,
}

impl ServerState {
    pub fn new(max_concurrent_queries: usize) -> ServerState {
        ServerState {
            cache: Arc::new(ConnectionCache::new()),
            query_permits: Arc::new(Semaphore::new(max_concurrent_queries)),
        }
    }
}

/// Per-route state, built once at route setup and shared by all requests to
/// that route.
pub struct RouteState {
    pub config: RouteConfig,
    /// Cache key, serialized once so the request path never re-serializes
    /// the configuration.
    pub cache_key: String,
    /// Configured response headers, validated at setup.
    pub headers: Vec<(HeaderName, HeaderValue)>,
    /// Resolved post-insert transform, if the route configures one.
    pub transform: Option<PostTransform>,
    pub server: ServerState,
}
