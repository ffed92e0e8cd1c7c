//! Login, refresh, logout and per-request authentication.
//!
//! A session is one access token plus one refresh token issued together at
//! login. Refreshing mints a new access token and leaves the refresh token
//! as it is; revoking the refresh token ends the session once the current
//! access token expires.

use std::sync::{Arc, LazyLock};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::db::{RefreshTokenTable, User};
use crate::jwt::{ACCESS_TOKEN_DURATION, JwtConfig};
use crate::password::{PasswordError, hash_password, verify_password};
use crate::refresh::{
    REFRESH_TOKEN_DURATION, RecordError, RefreshError, RefreshTokenRecords, RefreshTokenStore,
};

/// Checked on logins for unknown emails, so they cost one Argon2 run like a wrong password.
static DUMMY_DIGEST: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("chirpy-no-such-account").ok());

/// The session service as wired to the SQLite refresh token table.
pub type Sessions = SessionService<RefreshTokenTable>;

/// Token pair returned by a successful login.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub access_token: String,
    pub refresh_token: String,
}

/// Session failures as seen by request handlers.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Unknown account or wrong password; the two are not distinguished.
    #[error("incorrect email or password")]
    InvalidCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
    /// The refresh token is unknown, revoked or expired.
    #[error("refresh token denied")]
    RefreshDenied,
    #[error(transparent)]
    HashingFailure(#[from] PasswordError),
    /// A token could not be minted, or a login's refresh token could not be stored.
    #[error("could not create session")]
    SessionCreationFailure,
    #[error("session storage failed: {0}")]
    Persistence(#[source] RecordError),
}

impl From<RefreshError> for SessionError {
    fn from(err: RefreshError) -> Self {
        match err {
            RefreshError::Persistence(e) => {
                error!(error = %e, "Refresh token lookup failed");
                SessionError::Persistence(e)
            }
            reason => {
                warn!(%reason, "Refresh denied");
                SessionError::RefreshDenied
            }
        }
    }
}

pub struct SessionService<R> {
    jwt: Arc<JwtConfig>,
    refresh_tokens: RefreshTokenStore<R>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl<R: RefreshTokenRecords> SessionService<R> {
    /// Create a session service with the standard token lifetimes.
    pub fn new(jwt: Arc<JwtConfig>, records: R) -> Self {
        Self::with_lifetimes(jwt, records, ACCESS_TOKEN_DURATION, REFRESH_TOKEN_DURATION)
    }

    pub fn with_lifetimes(
        jwt: Arc<JwtConfig>,
        records: R,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            jwt,
            refresh_tokens: RefreshTokenStore::new(records),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Start a session for `account`, the result of looking up the submitted email.
    pub async fn login(
        &self,
        account: Option<&User>,
        password: &str,
        now: u64,
    ) -> Result<IssuedSession, SessionError> {
        let Some(account) = account else {
            if let Some(digest) = DUMMY_DIGEST.as_deref() {
                let _ = verify_password(password, digest);
            }
            return Err(SessionError::InvalidCredentials);
        };

        match verify_password(password, &account.hashed_password) {
            Ok(true) => {}
            Ok(false) => return Err(SessionError::InvalidCredentials),
            Err(e) => {
                warn!(user_id = %account.id, error = %e, "Stored password digest is unreadable");
                return Err(SessionError::InvalidCredentials);
            }
        }

        let access_token = self
            .jwt
            .issue(account.id, self.access_ttl, now)
            .map_err(|e| {
                error!(error = %e, "Failed to issue access token");
                SessionError::SessionCreationFailure
            })?;

        let refresh_token = self
            .refresh_tokens
            .issue(account.id, self.refresh_ttl, now)
            .await
            .map_err(|e| {
                error!(user_id = %account.id, error = %e, "Failed to store refresh token");
                SessionError::SessionCreationFailure
            })?;

        Ok(IssuedSession {
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from a refresh token. The refresh token is not rotated.
    pub async fn refresh(&self, refresh_token: &str, now: u64) -> Result<String, SessionError> {
        let user_id = self.refresh_tokens.check_valid(refresh_token, now).await?;

        self.jwt.issue(user_id, self.access_ttl, now).map_err(|e| {
            error!(error = %e, "Failed to issue access token");
            SessionError::SessionCreationFailure
        })
    }

    /// Revoke a refresh token. Possession of the token is the only authority needed.
    pub async fn revoke(&self, refresh_token: &str, now: u64) -> Result<(), SessionError> {
        self.refresh_tokens
            .revoke(refresh_token, now)
            .await
            .map_err(SessionError::from)
    }

    /// Identify the caller behind an access token.
    pub fn authenticate(&self, access_token: &str, now: u64) -> Result<Uuid, SessionError> {
        self.jwt
            .validate(access_token, now)
            .map_err(|_| SessionError::InvalidToken)
    }
}
