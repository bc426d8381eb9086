use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

/// Generated-image record; one row per generate call, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QrCode {
    pub id: i64,
    pub user_id: i64,
    pub data: String,
    pub filename: String,
    pub created_at: OffsetDateTime,
}

impl QrCode {
    pub async fn create(
        db: &SqlitePool,
        user_id: i64,
        data: &str,
        filename: &str,
    ) -> Result<QrCode, sqlx::Error> {
        sqlx::query_as::<_, QrCode>(
            r#"
            INSERT INTO qr_codes (user_id, data, filename, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, user_id, data, filename, created_at
            "#,
        )
        .bind(user_id)
        .bind(data)
        .bind(filename)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await
    }

    pub async fn list_by_user(
        db: &SqlitePool,
        user_id: i64,
    ) -> Result<Vec<QrCode>, sqlx::Error> {
        sqlx::query_as::<_, QrCode>(
            r#"
            SELECT id, user_id, data, filename, created_at
            FROM qr_codes
            WHERE user_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }
}
