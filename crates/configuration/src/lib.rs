pub mod error;
pub mod route;

pub use error::ConfigurationError;
pub use route::{
    make_runtime_config, parse_routes_file, BackendKind, ClauseValue, ParsedRouteConfig,
    RouteConfig,
};
