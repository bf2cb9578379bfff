//! An HTTP service that exposes relational tables through declarative URL
//! query parameters.

pub mod error;
pub mod rendering;
pub mod routes;
pub mod server;
pub mod state;
pub mod transforms;

pub use error::RequestError;
pub use server::build_router;
pub use state::ServerState;
pub use transforms::TransformRegistry;
