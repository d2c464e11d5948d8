use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::user_repo::UserRepo;
use crate::services::accounts::token::{TokenExpirationPolicy, hash_login_token};
use crate::services::accounts::types::{Identity, Resolution, UserAccount};

/// Read-only account lookup used by the resolver.
///
/// Implementations return the single account holding a login token with the
/// given hash, with all of that account's login tokens populated.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_hashed_token(&self, hashed_token: &str) -> RepoResult<Option<UserAccount>>;
}

#[async_trait]
impl AccountStore for UserRepo {
    async fn find_by_hashed_token(&self, hashed_token: &str) -> RepoResult<Option<UserAccount>> {
        let row = UserRepo::find_by_hashed_token(self, hashed_token).await?;
        Ok(row.map(UserAccount::from))
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The presented token is not a string.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("account lookup failed: {0}")]
    Store(#[from] RepoError),
}

/// Turns a login token into the identity of a live session.
#[derive(Clone)]
pub struct TokenResolver {
    store: Arc<dyn AccountStore>,
    policy: TokenExpirationPolicy,
}

impl std::fmt::Debug for TokenResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResolver")
            .field("policy", &self.policy)
            .finish()
    }
}

impl TokenResolver {
    pub fn new(store: Arc<dyn AccountStore>, policy: TokenExpirationPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> TokenExpirationPolicy {
        self.policy
    }

    pub async fn resolve(&self, token: Option<&[u8]>) -> Result<Resolution, ResolveError> {
        self.resolve_at(token, Utc::now()).await
    }

    /// Resolve `token` as seen at `now`.
    ///
    /// - absent or empty token: `NotFound`, the store is not queried
    /// - token that is not valid UTF-8: `InvalidArgument`
    /// - unknown or expired token: `NotFound`
    pub async fn resolve_at(
        &self,
        token: Option<&[u8]>,
        now: DateTime<Utc>,
    ) -> Result<Resolution, ResolveError> {
        let Some(raw) = token.filter(|t| !t.is_empty()) else {
            return Ok(Resolution::NotFound);
        };

        let token = std::str::from_utf8(raw).map_err(|_| {
            debug!("login token is not a string");
            ResolveError::InvalidArgument("login token must be a string".to_string())
        })?;

        let hashed_token = hash_login_token(token);

        let account = self
            .store
            .find_by_hashed_token(&hashed_token)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to look up account by login token");
                ResolveError::Store(e)
            })?;

        let Some(account) = account else {
            debug!("No account holds this login token");
            return Ok(Resolution::NotFound);
        };

        // An account may be logged in from several places; only the matching
        // session decides expiry.
        let Some(record) = account.login_token(&hashed_token) else {
            debug!(user_id = %account.id, "Account returned without the matching login token");
            return Ok(Resolution::NotFound);
        };

        if self.policy.is_expired(record.when, now) {
            debug!(user_id = %account.id, issued_at = %record.when, "Login token expired");
            return Ok(Resolution::NotFound);
        }

        debug!(user_id = %account.id, issued_at = %record.when, "Login token resolved");

        let user_id = account.id.clone();
        Ok(Resolution::Found(Identity {
            user: account,
            user_id,
        }))
    }
}
