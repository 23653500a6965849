pub mod graphql;
pub mod handlers;
pub mod routes;
pub mod tenant_extractor;

pub use routes::*;
