use db::models::move_code::MoveCode;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MoveCodeError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Move code is required")]
    MissingCode,
    #[error("Move code not found")]
    NotFound,
}

pub struct MoveCodeService;

impl MoveCodeService {
    /// Insert or replace the caller's latest code; the flag reports a new row.
    pub async fn save(
        pool: &SqlitePool,
        user_id: Uuid,
        code: &str,
    ) -> Result<(MoveCode, bool), MoveCodeError> {
        if code.trim().is_empty() {
            return Err(MoveCodeError::MissingCode);
        }
        let (saved, created) = MoveCode::upsert(pool, user_id, code).await?;
        info!(user_id = %user_id, created, bytes = code.len(), "Saved Move code");
        Ok((saved, created))
    }

    /// Only the owner may read their code; anyone else gets NotFound.
    pub async fn latest(
        pool: &SqlitePool,
        caller_id: Uuid,
        requested_user_id: Uuid,
    ) -> Result<MoveCode, MoveCodeError> {
        if caller_id != requested_user_id {
            return Err(MoveCodeError::NotFound);
        }
        MoveCode::find_by_user_id(pool, caller_id)
            .await?
            .ok_or(MoveCodeError::NotFound)
    }
}
