use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use super::parse_uuid;

#[derive(Clone)]
pub struct ChirpStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone)]
pub struct Chirp {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: String,
    pub updated_at: String,
}

/// Listing order by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChirpOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(sqlx::FromRow)]
struct ChirpRow {
    id: String,
    body: String,
    user_id: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ChirpRow> for Chirp {
    type Error = sqlx::Error;

    fn try_from(row: ChirpRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&row.id)?,
            body: row.body,
            user_id: parse_uuid(&row.user_id)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl ChirpStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a chirp. The body is stored as given.
    pub async fn create(&self, user_id: Uuid, body: &str) -> Result<Chirp, sqlx::Error> {
        let row: ChirpRow = sqlx::query_as(
            "INSERT INTO chirps (id, body, user_id) VALUES (?, ?, ?)
             RETURNING id, body, user_id, created_at, updated_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(body)
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    /// Get a chirp by id.
    pub async fn get(&self, id: Uuid) -> Result<Option<Chirp>, sqlx::Error> {
        let row: Option<ChirpRow> = sqlx::query_as(
            "SELECT id, body, user_id, created_at, updated_at FROM chirps WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Chirp::try_from).transpose()
    }

    /// List chirps, optionally only those by one author.
    pub async fn list(
        &self,
        author: Option<Uuid>,
        order: ChirpOrder,
    ) -> Result<Vec<Chirp>, sqlx::Error> {
        let sql = match order {
            ChirpOrder::Asc => {
                "SELECT id, body, user_id, created_at, updated_at FROM chirps
                 WHERE (? IS NULL OR user_id = ?)
                 ORDER BY created_at ASC, rowid ASC"
            }
            ChirpOrder::Desc => {
                "SELECT id, body, user_id, created_at, updated_at FROM chirps
                 WHERE (? IS NULL OR user_id = ?)
                 ORDER BY created_at DESC, rowid DESC"
            }
        };
        let author = author.map(|id| id.to_string());
        let rows: Vec<ChirpRow> = sqlx::query_as(sql)
            .bind(author.clone())
            .bind(author)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Chirp::try_from).collect()
    }

    /// Delete a chirp by id.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
