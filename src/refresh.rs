//! Opaque refresh tokens with server-side records.
//!
//! A refresh token is 32 random bytes, base64url encoded. The record keyed by
//! that value decides whether it can still mint access tokens: it must exist,
//! must not be revoked and must not have reached its expiry.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Refresh token lifetime: 60 days.
pub const REFRESH_TOKEN_DURATION: Duration = Duration::from_secs(60 * 24 * 60 * 60);

const TOKEN_BYTES: usize = 32;

/// A stored refresh token. Timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: u64,
    pub expires_at: u64,
    pub revoked_at: Option<u64>,
}

/// Errors reported by a [`RefreshTokenRecords`] backend.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A record with the same token value already exists.
    #[error("refresh token already exists")]
    Duplicate,
    #[error(transparent)]
    Backend(#[from] sqlx::Error),
}

/// Persistence for refresh token records, keyed by token value.
///
/// Implementations must make each call atomic on its single record and must
/// reject a second `put` of an existing token value with [`RecordError::Duplicate`].
pub trait RefreshTokenRecords: Send + Sync {
    fn put(
        &self,
        record: &RefreshTokenRecord,
    ) -> impl Future<Output = Result<(), RecordError>> + Send;

    fn get_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<RefreshTokenRecord>, RecordError>> + Send;

    /// Set `revoked_at` to `now` unless it is already set.
    /// Returns false if no record has this token value.
    fn mark_revoked(
        &self,
        token: &str,
        now: u64,
    ) -> impl Future<Output = Result<bool, RecordError>> + Send;
}

/// Why a refresh token was not accepted.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("refresh token not found")]
    NotFound,
    #[error("refresh token revoked")]
    Revoked,
    #[error("refresh token expired")]
    Expired,
    #[error("refresh token storage failed: {0}")]
    Persistence(#[from] RecordError),
}

/// Issues, checks and revokes refresh tokens on top of a record backend.
#[derive(Clone)]
pub struct RefreshTokenStore<R> {
    records: R,
}

impl<R: RefreshTokenRecords> RefreshTokenStore<R> {
    pub fn new(records: R) -> Self {
        Self { records }
    }

    /// Create and persist a new refresh token for `owner`.
    ///
    /// A token value collision surfaces as [`RecordError::Duplicate`]; the
    /// existing record is never overwritten.
    pub async fn issue(&self, owner: Uuid, ttl: Duration, now: u64) -> Result<String, RecordError> {
        let token = generate_token();
        let record = RefreshTokenRecord {
            token: token.clone(),
            user_id: owner,
            created_at: now,
            expires_at: now.saturating_add(ttl.as_secs()),
            revoked_at: None,
        };

        self.records.put(&record).await?;
        Ok(token)
    }

    /// Return the owner of `token` if it may still be used at `now`.
    pub async fn check_valid(&self, token: &str, now: u64) -> Result<Uuid, RefreshError> {
        let record = self
            .records
            .get_by_token(token)
            .await?
            .ok_or(RefreshError::NotFound)?;

        if record.revoked_at.is_some() {
            return Err(RefreshError::Revoked);
        }

        if now >= record.expires_at {
            return Err(RefreshError::Expired);
        }

        Ok(record.user_id)
    }

    /// Revoke `token`. Revoking an already revoked token succeeds.
    pub async fn revoke(&self, token: &str, now: u64) -> Result<(), RefreshError> {
        if self.records.mark_revoked(token, now).await? {
            Ok(())
        } else {
            Err(RefreshError::NotFound)
        }
    }
}

fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}
