/*
 * Responsibility
 * - The per-request context handed to every resolver
 * - Shallow merge of the caller's base context with the resolved identity
 */
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, Uri};
use serde::Serialize;
use serde_json::Value;

use crate::services::accounts::{Identity, Resolution, UserAccount};

/// String-keyed bag of values visible to resolvers.
pub type ContextMap = serde_json::Map<String, Value>;

pub const USER_KEY: &str = "user";
pub const USER_ID_KEY: &str = "userId";

/// What a context factory gets to see of the incoming request.
#[derive(Clone, Debug)]
pub struct RequestInfo {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RequestInfo {
    pub fn from_request(req: &Request<Body>) -> Self {
        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
            headers: req.headers().clone(),
        }
    }
}

/// Context of a single GraphQL request. Built fresh per request, never shared.
///
/// Resolvers read it with `ctx.data::<RequestContext>()`.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    values: ContextMap,
    identity: Option<Identity>,
}

impl RequestContext {
    /// Merge `base` with the outcome of token resolution.
    ///
    /// `user` and `userId` from a resolved identity replace same-named keys of
    /// `base`. When nothing resolved, `base` is kept as-is.
    pub fn merge(base: ContextMap, resolution: Resolution) -> Self {
        let mut values = base;

        let identity = match resolution {
            Resolution::Found(identity) => {
                insert_serialized(&mut values, USER_KEY, &identity.user);
                values.insert(
                    USER_ID_KEY.to_string(),
                    Value::String(identity.user_id.clone()),
                );
                Some(identity)
            }
            Resolution::NotFound => None,
        };

        Self { values, identity }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &ContextMap {
        &self.values
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn user(&self) -> Option<&UserAccount> {
        self.identity.as_ref().map(|i| &i.user)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.user_id.as_str())
    }
}

/// Insert `value` under `key`. A value that fails to serialize leaves the key
/// out entirely; the context never carries a null in its place.
fn insert_serialized<T: Serialize>(values: &mut ContextMap, key: &str, value: &T) {
    match serde_json::to_value(value) {
        Ok(v) => {
            values.insert(key.to_string(), v);
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "Could not serialize context value");
            values.remove(key);
        }
    }
}
