//! GraphQL over axum with a request context derived from a login token.
//!
//! Each request's `meteor-login-token` header is resolved to a user account
//! (hashed lookup + expiry check) and merged into the context resolvers see.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod graphql;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
