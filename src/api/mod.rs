pub mod auth;
pub mod client;
pub mod error;
pub mod query;
pub mod rpc;

pub use auth::{Identity, Session, SignUpOutcome};
pub use client::ServiceClient;
pub use error::ApiError;
pub use query::QueryBuilder;
