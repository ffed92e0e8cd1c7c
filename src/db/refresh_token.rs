//! SQLite storage for refresh token records.
//!
//! Access tokens are stateless and never reach the database.

use sqlx::sqlite::SqlitePool;

use super::parse_uuid;
use crate::refresh::{RecordError, RefreshTokenRecord, RefreshTokenRecords};

#[derive(Clone)]
pub struct RefreshTokenTable {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    token: String,
    user_id: String,
    created_at: i64,
    expires_at: i64,
    revoked_at: Option<i64>,
}

impl TryFrom<RefreshTokenRow> for RefreshTokenRecord {
    type Error = sqlx::Error;

    fn try_from(row: RefreshTokenRow) -> Result<Self, Self::Error> {
        Ok(Self {
            token: row.token,
            user_id: parse_uuid(&row.user_id)?,
            created_at: to_unix(row.created_at),
            expires_at: to_unix(row.expires_at),
            revoked_at: row.revoked_at.map(to_unix),
        })
    }
}

impl RefreshTokenTable {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Delete all records that expired before `now`. Returns the number removed.
    pub async fn delete_expired(&self, now: u64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= ?")
            .bind(to_sql(now))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl RefreshTokenRecords for RefreshTokenTable {
    async fn put(&self, record: &RefreshTokenRecord) -> Result<(), RecordError> {
        sqlx::query(
            "INSERT INTO refresh_tokens (token, user_id, created_at, expires_at, revoked_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.token)
        .bind(record.user_id.to_string())
        .bind(to_sql(record.created_at))
        .bind(to_sql(record.expires_at))
        .bind(record.revoked_at.map(to_sql))
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => RecordError::Duplicate,
            e => RecordError::Backend(e),
        })?;
        Ok(())
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, RecordError> {
        let row: Option<RefreshTokenRow> = sqlx::query_as(
            "SELECT token, user_id, created_at, expires_at, revoked_at
             FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(RefreshTokenRecord::try_from).transpose()?)
    }

    async fn mark_revoked(&self, token: &str, now: u64) -> Result<bool, RecordError> {
        // COALESCE keeps the first revocation time; re-revoking still matches the row.
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = COALESCE(revoked_at, ?) WHERE token = ?",
        )
        .bind(to_sql(now))
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// SQLite integers are signed; unix seconds fit comfortably.
fn to_sql(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX)
}

fn to_unix(secs: i64) -> u64 {
    u64::try_from(secs).unwrap_or_default()
}
