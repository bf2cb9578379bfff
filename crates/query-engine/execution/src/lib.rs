pub mod cache;
pub mod error;
pub mod pool;
pub mod query;
pub mod rows;

pub use cache::ConnectionCache;
pub use error::Error;
pub use pool::Pool;
pub use rows::{Row, TabularResult};
