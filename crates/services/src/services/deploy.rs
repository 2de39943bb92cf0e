//! Publishes a user's latest Move code through an external CLI.

use std::{
    path::{Path, PathBuf},
    process::Output,
    time::Duration,
};

use db::models::move_code::MoveCode;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::process::Command;
use tracing::{info, warn};
use ts_rs::TS;
use utils::text::tail;
use uuid::Uuid;

use super::config::DeployConfig;

/// Upper bound on CLI output returned to callers
const MAX_OUTPUT_BYTES: usize = 4096;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Move code not found")]
    CodeNotFound,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("publish command is empty")]
    EmptyCommand,
    #[error("publish command exited with {status:?}")]
    Failed { status: Option<i32>, stderr: String },
    #[error("publish command timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DeployOutcome {
    pub message: String,
    pub output: String,
    pub source_path: String,
}

pub struct DeployService;

impl DeployService {
    pub async fn deploy(
        pool: &SqlitePool,
        config: &DeployConfig,
        user_id: Uuid,
    ) -> Result<DeployOutcome, DeployError> {
        let code = MoveCode::find_by_user_id(pool, user_id)
            .await?
            .ok_or(DeployError::CodeNotFound)?;

        let source_path = Self::write_source(&config.contracts_dir, user_id, &code.code).await?;
        info!(
            user_id = %user_id,
            path = %source_path.display(),
            "Publishing generated Move code"
        );

        let output = Self::publish(config, &source_path).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                user_id = %user_id,
                status = ?output.status.code(),
                stderr = %stderr,
                "Publish command failed"
            );
            return Err(DeployError::Failed {
                status: output.status.code(),
                stderr: tail(&stderr, MAX_OUTPUT_BYTES).to_string(),
            });
        }

        Ok(DeployOutcome {
            message: "Deployment successful".to_string(),
            output: tail(&stdout, MAX_OUTPUT_BYTES).to_string(),
            source_path: source_path.display().to_string(),
        })
    }

    async fn write_source(dir: &Path, user_id: Uuid, code: &str) -> Result<PathBuf, DeployError> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("generated_{}.move", user_id));
        tokio::fs::write(&path, code).await?;
        Ok(path)
    }

    async fn publish(config: &DeployConfig, source_path: &Path) -> Result<Output, DeployError> {
        let (program, args) = config
            .publish_command
            .split_first()
            .ok_or(DeployError::EmptyCommand)?;

        let mut command = Command::new(program);
        command.args(args).arg(source_path).kill_on_drop(true);

        match config.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| DeployError::TimedOut(limit))?
                .map_err(DeployError::from),
            None => Ok(command.output().await?),
        }
    }
}
