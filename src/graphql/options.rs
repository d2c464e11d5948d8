/*
 * Responsibility
 * - Every recognized GraphQL server option, with its default
 * - Built once at startup and handed to create_graphql_server
 */
use async_graphql::ServerError;
use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::graphql::context::{ContextMap, RequestInfo};
use crate::graphql::response::{FormattedError, default_format_error};
use crate::services::accounts::Resolution;

pub const DEFAULT_GRAPHQL_PATH: &str = "/graphql";

pub type ContextFactory = Arc<dyn Fn(&RequestInfo, &Resolution) -> ContextMap + Send + Sync>;
pub type ErrorFormatter = Arc<dyn Fn(&ServerError) -> FormattedError + Send + Sync>;

/// Where the base context of each request comes from.
#[derive(Clone)]
pub enum ContextSource {
    /// Used as-is for every request.
    Static(ContextMap),
    /// Called per request with the request and the resolution outcome.
    Factory(ContextFactory),
}

impl ContextSource {
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn(&RequestInfo, &Resolution) -> ContextMap + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(f))
    }

    pub fn base(&self, info: &RequestInfo, resolution: &Resolution) -> ContextMap {
        match self {
            ContextSource::Static(map) => map.clone(),
            ContextSource::Factory(f) => f(info, resolution),
        }
    }
}

impl Default for ContextSource {
    fn default() -> Self {
        Self::Static(ContextMap::new())
    }
}

impl fmt::Debug for ContextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextSource::Static(map) => f.debug_tuple("Static").field(map).finish(),
            ContextSource::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

#[derive(Clone)]
pub struct GraphqlOptions {
    pub context: ContextSource,
    pub format_error: ErrorFormatter,
    /// Log execution errors and keep their extensions in responses.
    pub debug: bool,
    pub path: String,
    /// Serve GraphiQL on `GET {path}`.
    pub playground: bool,
}

impl GraphqlOptions {
    pub fn new(debug: bool) -> Self {
        Self {
            context: ContextSource::default(),
            format_error: Arc::new(default_format_error),
            debug,
            path: DEFAULT_GRAPHQL_PATH.to_string(),
            playground: debug,
        }
    }

    /// Defaults derived from the process configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut options = Self::new(config.graphql_debug);
        options.path = config.graphql_path.clone();
        options
    }

    pub fn with_context(mut self, context: ContextMap) -> Self {
        self.context = ContextSource::Static(context);
        self
    }

    pub fn with_context_factory<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestInfo, &Resolution) -> ContextMap + Send + Sync + 'static,
    {
        self.context = ContextSource::factory(f);
        self
    }

    pub fn with_format_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&ServerError) -> FormattedError + Send + Sync + 'static,
    {
        self.format_error = Arc::new(f);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_playground(mut self, playground: bool) -> Self {
        self.playground = playground;
        self
    }
}

impl Default for GraphqlOptions {
    fn default() -> Self {
        Self::new(true)
    }
}

impl fmt::Debug for GraphqlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphqlOptions")
            .field("context", &self.context)
            .field("debug", &self.debug)
            .field("path", &self.path)
            .field("playground", &self.playground)
            .finish()
    }
}
