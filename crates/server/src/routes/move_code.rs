use axum::{
    Extension, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::{
    move_code::{MoveCode, SaveMoveCode},
    user::User,
};
use services::services::{
    move_code::MoveCodeService,
    move_generator::{self, GenerateRequest, GenerationReport},
};
use tracing::debug;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, extract::Json, middleware::require_auth};

/// POST /api/move/generate
/// Preview code for a graph without storing anything
pub async fn generate(
    Extension(user): Extension<User>,
    Json(payload): Json<GenerateRequest>,
) -> ResponseJson<ApiResponse<GenerationReport>> {
    let report = move_generator::generate(&payload.nodes, &payload.edges);
    debug!(
        user_id = %user.id,
        one_to_many = report.relationships.one_to_many.len(),
        many_to_one = report.relationships.many_to_one.len(),
        "Generated Move preview"
    );
    ResponseJson(ApiResponse::success(report))
}

/// POST /api/move/save
pub async fn save(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<SaveMoveCode>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<MoveCode>>), ApiError> {
    let (code, created) = MoveCodeService::save(&state.db().pool, user.id, &payload.code).await?;
    let (status, message) = if created {
        (StatusCode::CREATED, "Move code saved successfully")
    } else {
        (StatusCode::OK, "Move code updated successfully")
    };
    Ok((
        status,
        ResponseJson(ApiResponse::success_with_message(code, message)),
    ))
}

/// GET /api/move/{user_id}
pub async fn latest(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(user_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<MoveCode>>, ApiError> {
    let requested =
        Uuid::parse_str(&user_id).map_err(|_| ApiError::NotFound("Move code not found"))?;
    let code = MoveCodeService::latest(&state.db().pool, user.id, requested).await?;
    Ok(ResponseJson(ApiResponse::success(code)))
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/move/generate", post(generate))
        .route("/move/save", post(save))
        .route("/move/{user_id}", get(latest))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}
