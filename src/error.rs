/*
 * Responsibility
 * - Errors that end a request before GraphQL execution
 * - HTTP status mapping; the body shape is decided by the GraphQL error formatter
 */
use axum::http::StatusCode;
use thiserror::Error;

use crate::services::accounts::ResolveError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::InvalidArgument(message) => AppError::InvalidArgument(message),
            // Already logged by the resolver; never leak store details to clients.
            ResolveError::Store(_) => AppError::Internal,
        }
    }
}
