//! In-memory account store for tests.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::repos::error::{RepoError, RepoResult};
use crate::services::accounts::resolver::AccountStore;
use crate::services::accounts::token::hash_login_token;
use crate::services::accounts::types::{LoginTokenRecord, UserAccount};

#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: Vec<UserAccount>,
    fail: bool,
    queries: AtomicUsize,
}

impl MemoryAccountStore {
    pub fn new(accounts: Vec<UserAccount>) -> Self {
        Self {
            accounts,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_hashed_token(&self, hashed_token: &str) -> RepoResult<Option<UserAccount>> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(RepoError::Db(sqlx::Error::PoolTimedOut));
        }

        Ok(self
            .accounts
            .iter()
            .find(|a| a.login_token(hashed_token).is_some())
            .cloned())
    }
}

/// Account `id` holding one session per `(raw token, issued at)` pair.
pub fn account(id: &str, sessions: &[(&str, DateTime<Utc>)]) -> UserAccount {
    UserAccount {
        id: id.to_string(),
        username: Some(format!("user-{id}")),
        created_at: DateTime::<Utc>::UNIX_EPOCH,
        login_tokens: sessions
            .iter()
            .map(|(token, when)| LoginTokenRecord {
                hashed_token: hash_login_token(token),
                when: *when,
            })
            .collect(),
    }
}
