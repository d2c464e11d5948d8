use tracing::debug;

use crate::graphql::context::{RequestContext, RequestInfo};
use crate::graphql::options::ContextSource;
use crate::services::accounts::{LOGIN_TOKEN_HEADER, ResolveError, TokenResolver};

/// Builds the `RequestContext` of each GraphQL request.
#[derive(Clone, Debug)]
pub struct ContextBuilder {
    resolver: TokenResolver,
    context: ContextSource,
}

impl ContextBuilder {
    pub fn new(resolver: TokenResolver, context: ContextSource) -> Self {
        Self { resolver, context }
    }

    /// Resolve the login token of `info` and merge it into the base context.
    ///
    /// Resolution errors are returned as-is; the request must not execute.
    pub async fn build(&self, info: RequestInfo) -> Result<RequestContext, ResolveError> {
        let token = info.headers.get(LOGIN_TOKEN_HEADER).map(|v| v.as_bytes());
        let resolution = self.resolver.resolve(token).await?;

        debug!(
            authenticated = resolution.identity().is_some(),
            "Built GraphQL request context"
        );

        let base = self.context.base(&info, &resolution);
        Ok(RequestContext::merge(base, resolution))
    }
}
