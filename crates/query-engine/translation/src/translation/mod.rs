//! Translate resolved request clauses to an ExecutionPlan (SQL) to be run
//! against the database.

pub mod aggregates;
pub mod error;
pub mod filtering;
pub mod mutation;
pub mod params;
pub mod query;
pub mod sorting;
pub mod values;

pub use error::Error;
pub use query::ExecutionPlan;
