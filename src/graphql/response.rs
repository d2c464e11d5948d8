//! Error formatting and the JSON body returned by the GraphQL endpoint.
use async_graphql::{ErrorExtensionValues, PathSegment, Pos, ServerError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Client-facing shape of a GraphQL error.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormattedError {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Pos>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
    /// Only emitted in debug mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ErrorExtensionValues>,
}

/// Keeps `message`, `locations` and `path`; drops everything else.
pub fn default_format_error(err: &ServerError) -> FormattedError {
    FormattedError {
        message: err.message.clone(),
        locations: err.locations.clone(),
        path: err.path.clone(),
        extensions: None,
    }
}

#[derive(Debug, Serialize)]
pub struct GraphqlBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<async_graphql::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FormattedError>,
}

/// A GraphQL body paired with the HTTP status it is sent with.
#[derive(Debug)]
pub struct GraphqlHttpResponse {
    pub status: StatusCode,
    pub body: GraphqlBody,
}

impl IntoResponse for GraphqlHttpResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
