/*
 * Responsibility
 * - Wire an async-graphql executor onto an axum Router
 * - Build the RequestContext in a middleware before the handler runs
 * - Format execution errors (and context errors) for clients
 */
use async_graphql::http::GraphiQLSource;
use async_graphql::{Executor, ServerError};
use async_graphql_axum::GraphQLRequest;
use axum::{
    Extension, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;

use crate::error::AppError;
use crate::graphql::builder::ContextBuilder;
use crate::graphql::context::{RequestContext, RequestInfo};
use crate::graphql::options::GraphqlOptions;
use crate::graphql::response::{FormattedError, GraphqlBody, GraphqlHttpResponse};
use crate::services::accounts::TokenResolver;

/// Executor plus everything needed to serve it. Cheap to clone.
#[derive(Clone)]
pub struct GraphqlServer<E> {
    executor: E,
    builder: Arc<ContextBuilder>,
    options: Arc<GraphqlOptions>,
}

impl<E> std::fmt::Debug for GraphqlServer<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphqlServer")
            .field("builder", &self.builder)
            .field("options", &self.options)
            .finish()
    }
}

pub fn create_graphql_server<E: Executor>(
    executor: E,
    resolver: TokenResolver,
    options: GraphqlOptions,
) -> GraphqlServer<E> {
    let builder = ContextBuilder::new(resolver, options.context.clone());

    GraphqlServer {
        executor,
        builder: Arc::new(builder),
        options: Arc::new(options),
    }
}

impl<E: Executor> GraphqlServer<E> {
    pub fn options(&self) -> &GraphqlOptions {
        &self.options
    }

    pub fn builder(&self) -> &ContextBuilder {
        &self.builder
    }

    fn format(&self, err: &ServerError) -> FormattedError {
        let mut formatted = (self.options.format_error)(err);

        if self.options.debug {
            tracing::warn!(
                message = %err.message,
                path = ?err.path,
                locations = ?err.locations,
                "graphql execution error"
            );
            if formatted.extensions.is_none() {
                formatted.extensions = err.extensions.clone();
            }
        } else {
            formatted.extensions = None;
        }

        formatted
    }

    fn render(&self, response: async_graphql::Response) -> GraphqlHttpResponse {
        let errors = response.errors.iter().map(|e| self.format(e)).collect();

        GraphqlHttpResponse {
            status: StatusCode::OK,
            body: GraphqlBody {
                data: Some(response.data),
                errors,
            },
        }
    }

    fn reject(&self, err: AppError) -> GraphqlHttpResponse {
        let status = err.status_code();
        let error = ServerError::new(err.to_string(), None);

        GraphqlHttpResponse {
            status,
            body: GraphqlBody {
                data: None,
                errors: vec![self.format(&error)],
            },
        }
    }
}

/// Attach the GraphQL endpoint (and GraphiQL when enabled) to `router`.
///
/// Example:
/// ```ignore
/// let server = graphql::create_graphql_server(schema, resolver, options);
/// let app = graphql::apply(app, server);
/// ```
pub fn apply<S, E>(router: Router<S>, server: GraphqlServer<E>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    E: Executor,
{
    let path = server.options.path.clone();

    let mut endpoint = post(graphql_handler::<E>).route_layer(middleware::from_fn_with_state(
        server.clone(),
        context_middleware::<E>,
    ));
    if server.options.playground {
        endpoint = endpoint.get(graphql_playground::<E>);
    }

    let routes: Router<S> = Router::new()
        .route(&path, endpoint)
        .with_state(server);

    router.merge(routes)
}

async fn context_middleware<E: Executor>(
    State(server): State<GraphqlServer<E>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let info = RequestInfo::from_request(&req);

    match server.builder.build(info).await {
        Ok(ctx) => {
            // middleware → handler
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(err) => server.reject(AppError::from(err)).into_response(),
    }
}

async fn graphql_handler<E: Executor>(
    State(server): State<GraphqlServer<E>>,
    Extension(ctx): Extension<RequestContext>,
    req: GraphQLRequest,
) -> Response {
    let request = req.into_inner().data(ctx);
    let response = server.executor.execute(request).await;
    server.render(response).into_response()
}

async fn graphql_playground<E: Executor>(State(server): State<GraphqlServer<E>>) -> Html<String> {
    Html(
        GraphiQLSource::build()
            .endpoint(&server.options.path)
            .finish(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::schema::{AppSchema, build_schema};
    use crate::services::accounts::TokenExpirationPolicy;
    use crate::services::accounts::testing::{MemoryAccountStore, account};
    use async_graphql::ErrorExtensions;
    use axum::http::{HeaderValue, Method};
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn resolver() -> TokenResolver {
        let store = MemoryAccountStore::new(vec![
            account("abc", &[("valid-token", Utc::now() - Duration::days(1))]),
            account("old", &[("stale-token", Utc::now() - Duration::days(120))]),
        ]);
        TokenResolver::new(Arc::new(store), TokenExpirationPolicy::default())
    }

    fn app(options: GraphqlOptions) -> Router {
        let server: GraphqlServer<AppSchema> =
            create_graphql_server(build_schema(), resolver(), options);
        apply(Router::new(), server)
    }

    async fn post_query(
        app: &Router,
        query: &str,
        token: Option<HeaderValue>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/graphql")
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("meteor-login-token", token);
        }
        let body = serde_json::to_vec(&json!({ "query": query })).unwrap();
        let request = builder.body(Body::from(body)).unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn request_without_token_is_anonymous() {
        let app = app(GraphqlOptions::new(false));
        let (status, body) = post_query(&app, "{ me { _id } userId }", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "data": { "me": null, "userId": null } }));
    }

    #[tokio::test]
    async fn valid_token_exposes_the_user() {
        let app = app(GraphqlOptions::new(false));
        let (status, body) = post_query(
            &app,
            "{ me { _id } userId }",
            Some(HeaderValue::from_static("valid-token")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["userId"], "abc");
        assert_eq!(body["data"]["me"]["_id"], "abc");
    }

    #[tokio::test]
    async fn expired_token_is_anonymous() {
        let app = app(GraphqlOptions::new(false));
        let (status, body) = post_query(
            &app,
            "{ userId }",
            Some(HeaderValue::from_static("stale-token")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "data": { "userId": null } }));
    }

    #[tokio::test]
    async fn malformed_token_is_a_formatted_400() {
        let app = app(GraphqlOptions::new(false));
        let bad = HeaderValue::from_bytes(&[0x2a, 0xff]).unwrap();
        let (status, body) = post_query(&app, "{ userId }", Some(bad)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("data").is_none());
        assert_eq!(
            body["errors"],
            json!([{ "message": "invalid argument: login token must be a string" }])
        );
    }

    #[tokio::test]
    async fn custom_formatter_applies_to_context_errors() {
        let options = GraphqlOptions::new(false).with_format_error(|e| FormattedError {
            message: e.message.to_uppercase(),
            locations: e.locations.clone(),
            path: e.path.clone(),
            extensions: None,
        });
        let app = app(options);
        let bad = HeaderValue::from_bytes(&[0xff]).unwrap();
        let (status, body) = post_query(&app, "{ userId }", Some(bad)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["errors"][0]["message"],
            "INVALID ARGUMENT: LOGIN TOKEN MUST BE A STRING"
        );
    }

    #[tokio::test]
    async fn production_strips_error_extensions() {
        let app = app(GraphqlOptions::new(false));
        let (_, body) = post_query(&app, "{ nope }", None).await;

        let error = &body["errors"][0];
        assert!(error.get("message").is_some());
        assert!(error.get("locations").is_some());
        assert!(error.get("extensions").is_none());
    }

    #[tokio::test]
    async fn debug_keeps_formatter_extensions() {
        let options = GraphqlOptions::new(true).with_format_error(|e| {
            let mut ext = async_graphql::ErrorExtensionValues::default();
            ext.set("code", "GRAPHQL_VALIDATION_FAILED");
            FormattedError {
                message: e.message.clone(),
                locations: e.locations.clone(),
                path: e.path.clone(),
                extensions: Some(ext),
            }
        });
        let app = app(options);
        let (_, body) = post_query(&app, "{ nope }", None).await;

        assert_eq!(
            body["errors"][0]["extensions"]["code"],
            "GRAPHQL_VALIDATION_FAILED"
        );
    }

    struct FailingQuery;

    #[async_graphql::Object]
    impl FailingQuery {
        async fn boom(&self) -> async_graphql::Result<i32> {
            Err(async_graphql::Error::new("boom").extend_with(|_, e| e.set("code", "BOOM")))
        }
    }

    fn failing_app(options: GraphqlOptions) -> Router {
        let schema = async_graphql::Schema::build(
            FailingQuery,
            async_graphql::EmptyMutation,
            async_graphql::EmptySubscription,
        )
        .finish();
        apply(Router::new(), create_graphql_server(schema, resolver(), options))
    }

    #[tokio::test]
    async fn debug_falls_back_to_resolver_extensions() {
        let app = failing_app(GraphqlOptions::new(true));
        let (status, body) = post_query(&app, "{ boom }", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["errors"][0]["message"], "boom");
        assert_eq!(body["errors"][0]["path"], json!(["boom"]));
        assert_eq!(body["errors"][0]["extensions"]["code"], "BOOM");
    }

    #[tokio::test]
    async fn production_drops_resolver_extensions() {
        let app = failing_app(GraphqlOptions::new(false));
        let (_, body) = post_query(&app, "{ boom }", None).await;

        assert_eq!(body["errors"][0]["message"], "boom");
        assert!(body["errors"][0].get("extensions").is_none());
    }

    #[tokio::test]
    async fn playground_follows_the_option() {
        let request = || {
            Request::builder()
                .method(Method::GET)
                .uri("/graphql")
                .body(Body::empty())
                .unwrap()
        };

        let on = app(GraphqlOptions::new(true)).oneshot(request()).await.unwrap();
        assert_eq!(on.status(), StatusCode::OK);

        let off = app(GraphqlOptions::new(false))
            .oneshot(request())
            .await
            .unwrap();
        assert_eq!(off.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
