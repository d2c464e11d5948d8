/*
 * Responsibility
 * - Public surface of the GraphQL layer (re-exports)
 */
pub mod builder;
pub mod context;
pub mod options;
pub mod response;
pub mod schema;
pub mod server;

pub use builder::ContextBuilder;
pub use context::{ContextMap, RequestContext, RequestInfo};
pub use options::{ContextSource, GraphqlOptions};
pub use response::{FormattedError, default_format_error};
pub use schema::{AppSchema, build_schema};
pub use server::{GraphqlServer, apply, create_graphql_server};
