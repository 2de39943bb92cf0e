use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Most recent generated Move source for a user
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct MoveCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for saving generated code
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct SaveMoveCode {
    /// Ignored when present; the owner comes from the bearer token.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub code: String,
}

impl MoveCode {
    /// Insert or replace the user's code. The flag is true when a new row was created.
    pub async fn upsert<'e, E>(
        executor: E,
        user_id: Uuid,
        code: &str,
    ) -> Result<(Self, bool), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let saved = sqlx::query_as::<_, MoveCode>(
            r#"INSERT INTO move_codes (id, user_id, code, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $4)
               ON CONFLICT(user_id) DO UPDATE SET
                   code = excluded.code,
                   updated_at = excluded.updated_at
               RETURNING id, user_id, code, created_at, updated_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(code)
        .bind(now)
        .fetch_one(executor)
        .await?;
        let created = saved.id == id;
        Ok((saved, created))
    }

    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, MoveCode>(
            r#"SELECT id, user_id, code, created_at, updated_at
               FROM move_codes
               WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}
