use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

/// Name of the request header carrying the login token.
pub const LOGIN_TOKEN_HEADER: &str = "meteor-login-token";

/// Login tokens live this long unless configured otherwise.
pub const DEFAULT_LOGIN_EXPIRATION_DAYS: i64 = 90;

/// Lifetime used when expiration is switched off (100 years).
pub const UNEXPIRING_LOGIN_TOKEN_DAYS: i64 = 365 * 100;

/// sha256(token), base64 encoded with padding.
///
/// This is the lookup key stored next to each session; raw tokens are never stored.
pub fn hash_login_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// Computes when a login token issued at `when` stops being valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenExpirationPolicy {
    lifetime: Duration,
}

impl TokenExpirationPolicy {
    pub fn new(lifetime: Duration) -> Self {
        Self { lifetime }
    }

    /// `None` means tokens never expire in practice.
    ///
    /// Day counts too large for a `Duration` saturate at `Duration::MAX`.
    pub fn from_days(days: Option<i64>) -> Self {
        let days = days.unwrap_or(UNEXPIRING_LOGIN_TOKEN_DAYS);
        Self::new(Duration::try_days(days).unwrap_or(Duration::MAX))
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn expires_at(&self, when: DateTime<Utc>) -> DateTime<Utc> {
        when.checked_add_signed(self.lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Expired once `now` reaches the expiration instant.
    pub fn is_expired(&self, when: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now >= self.expires_at(when)
    }
}

impl Default for TokenExpirationPolicy {
    fn default() -> Self {
        Self::from_days(Some(DEFAULT_LOGIN_EXPIRATION_DAYS))
    }
}
