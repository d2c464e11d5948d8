use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::repos::user_repo::{LoginTokenRow, UserAccountRow};

/// One active session of an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginTokenRecord {
    #[serde(rename = "hashedToken")]
    pub hashed_token: String,
    pub when: DateTime<Utc>,
}

/// Service-layer view of a user account.
///
/// Decoupled from `UserAccountRow` so resolvers never depend on the DB schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserAccount {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "loginTokens")]
    pub login_tokens: Vec<LoginTokenRecord>,
}

impl UserAccount {
    /// The session record matching `hashed_token`, if any.
    pub fn login_token(&self, hashed_token: &str) -> Option<&LoginTokenRecord> {
        self.login_tokens
            .iter()
            .find(|t| t.hashed_token == hashed_token)
    }
}

impl From<UserAccountRow> for UserAccount {
    fn from(row: UserAccountRow) -> Self {
        Self {
            id: row.id,
            username: row.user_name,
            created_at: row.created_at,
            login_tokens: row
                .login_tokens
                .0
                .into_iter()
                .map(LoginTokenRecord::from)
                .collect(),
        }
    }
}

impl From<LoginTokenRow> for LoginTokenRecord {
    fn from(row: LoginTokenRow) -> Self {
        Self {
            hashed_token: row.hashed_token,
            when: row.when,
        }
    }
}

/// A login token that resolved to a live session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user: UserAccount,
    pub user_id: String,
}

/// Outcome of resolving a login token.
///
/// Unknown and expired tokens both end up as `NotFound`; neither is an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Found(Identity),
    NotFound,
}

impl Resolution {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Resolution::Found(identity) => Some(identity),
            Resolution::NotFound => None,
        }
    }
}
