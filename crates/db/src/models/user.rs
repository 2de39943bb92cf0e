use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[ts(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $5)
               RETURNING id, name, email, password_hash, created_at, updated_at"#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, password_hash, created_at, updated_at
               FROM users
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Emails are stored lowercased; callers pass the normalized form.
    pub async fn find_by_email(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, password_hash, created_at, updated_at
               FROM users
               WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    #[tokio::test]
    async fn test_create_and_find() {
        let db = DBService::new_in_memory().await.unwrap();
        let id = Uuid::new_v4();
        let user = User::create(&db.pool, id, "Ada", "ada@example.com", "hash")
            .await
            .unwrap();
        assert_eq!(user.id, id);

        let by_email = User::find_by_email(&db.pool, "ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, id);
        assert!(User::find_by_id(&db.pool, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let db = DBService::new_in_memory().await.unwrap();
        User::create(&db.pool, Uuid::new_v4(), "A", "a@example.com", "h")
            .await
            .unwrap();
        let err = User::create(&db.pool, Uuid::new_v4(), "B", "a@example.com", "h")
            .await
            .unwrap_err();
        match err {
            sqlx::Error::Database(db_err) => assert!(db_err.is_unique_violation()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "secret".into(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }
}
