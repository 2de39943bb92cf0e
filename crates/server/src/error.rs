use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use services::services::{
    auth::AuthError, canvas::CanvasError, deploy::DeployError, move_code::MoveCodeError,
};
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error(transparent)]
    MoveCode(#[from] MoveCodeError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Deploy(#[from] DeployError),
    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),
    #[error("not authorized")]
    Unauthorized,
    #[error("{0}")]
    NotFound(&'static str),
}

impl ApiError {
    fn internal(context: &'static str, err: &dyn std::fmt::Display) -> (StatusCode, ApiResponse<()>) {
        error!(error = %err, "{}", context);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiResponse::error_with_detail(context, err.to_string()),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let client = |status: StatusCode, message: String| (status, ApiResponse::<()>::error(message));

        let (status, body) = match &self {
            ApiError::Canvas(CanvasError::InvalidGraph(e)) => {
                client(StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Canvas(CanvasError::NotFound) => {
                client(StatusCode::NOT_FOUND, "Canvas not found".to_string())
            }
            ApiError::Canvas(CanvasError::Database(e)) => Self::internal("Database error", e),

            ApiError::MoveCode(MoveCodeError::MissingCode) => {
                client(StatusCode::BAD_REQUEST, "Move code is required".to_string())
            }
            ApiError::MoveCode(MoveCodeError::NotFound) => {
                client(StatusCode::NOT_FOUND, "Move code not found".to_string())
            }
            ApiError::MoveCode(MoveCodeError::Database(e)) => Self::internal("Database error", e),

            ApiError::Auth(AuthError::Validation(msg)) => {
                client(StatusCode::BAD_REQUEST, msg.to_string())
            }
            ApiError::Auth(AuthError::EmailTaken) => {
                client(StatusCode::CONFLICT, self.to_string())
            }
            ApiError::Auth(AuthError::InvalidCredentials) => {
                client(StatusCode::UNAUTHORIZED, "Invalid email or password".to_string())
            }
            ApiError::Auth(AuthError::Unauthorized) | ApiError::Unauthorized => {
                client(StatusCode::UNAUTHORIZED, "Not authorized".to_string())
            }
            ApiError::Auth(AuthError::Database(e)) => Self::internal("Database error", e),
            ApiError::Auth(e @ (AuthError::PasswordHash(_) | AuthError::Token(_))) => {
                Self::internal("Authentication error", e)
            }

            ApiError::Deploy(DeployError::CodeNotFound) => {
                client(StatusCode::NOT_FOUND, "Move code not found".to_string())
            }
            ApiError::Deploy(DeployError::Failed { stderr, .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::error_with_detail("Deployment failed", stderr.clone()),
            ),
            ApiError::Deploy(DeployError::Database(e)) => Self::internal("Database error", e),
            ApiError::Deploy(e) => Self::internal("Deployment failed", e),

            ApiError::InvalidBody(rejection) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::error_with_detail("Invalid request body", rejection.body_text()),
            ),
            ApiError::NotFound(msg) => client(StatusCode::NOT_FOUND, msg.to_string()),
        };

        (status, ResponseJson(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use services::services::graph::GraphValidationError;

    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(CanvasError::InvalidGraph(GraphValidationError::EmptyNodeId).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(CanvasError::NotFound.into()), StatusCode::NOT_FOUND);
        assert_eq!(status_of(MoveCodeError::MissingCode.into()), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AuthError::EmailTaken.into()), StatusCode::CONFLICT);
        assert_eq!(
            status_of(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(ApiError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(DeployError::CodeNotFound.into()), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(
                DeployError::Failed {
                    status: Some(1),
                    stderr: "boom".into()
                }
                .into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ApiError::NotFound("Canvas not found")),
            StatusCode::NOT_FOUND
        );
    }
}
