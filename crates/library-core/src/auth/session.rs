use chrono::{DateTime, Duration, Utc};

use crate::api::LibraryError;

/// Upper bound applied to the server's `expires_in_sec`.
/// Keeps the expiry arithmetic far away from chrono's range limits.
const MAX_TOKEN_LIFETIME_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Bearer-token session held in memory by a `LibraryClient`.
///
/// A default session has no token and expires at the Unix epoch, so it is
/// already expired: "never logged in" and "token expired" are the same
/// state as far as the guard is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    expires_at: DateTime<Utc>,
    is_admin: bool,
}

impl Session {
    /// Build the session a successful login produces.
    pub fn issue(token: String, expires_in_sec: i64, is_admin: bool, now: DateTime<Utc>) -> Self {
        let lifetime = Duration::seconds(expires_in_sec.clamp(0, MAX_TOKEN_LIFETIME_SECS));
        Self {
            token: Some(token),
            expires_at: now + lifetime,
            is_admin,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check if session is valid (has a token and not expired)
    pub fn is_valid(&self) -> bool {
        self.token.is_some() && !self.is_expired()
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        (self.expires_at - Utc::now()).num_minutes().max(0)
    }

    /// Local expiry guard. Returns the token to attach, or fails without
    /// any I/O when the session is absent or past its expiry.
    pub fn ensure_authenticated_at(&self, now: DateTime<Utc>) -> Result<&str, LibraryError> {
        match self.token.as_deref() {
            Some(token) if !self.is_expired_at(now) => Ok(token),
            _ => Err(LibraryError::Authentication(
                "User not authenticated, log in first".to_string(),
            )),
        }
    }

    pub fn ensure_authenticated(&self) -> Result<&str, LibraryError> {
        self.ensure_authenticated_at(Utc::now())
    }
}
