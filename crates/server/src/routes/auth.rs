use axum::{
    Extension, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::user::User;
use services::services::auth::{AuthResponse, LoginRequest, RegisterRequest};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, extract::Json, middleware::require_auth};

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<AuthResponse>>), ApiError> {
    let response = state.auth().register(&state.db().pool, payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(response))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<AuthResponse>>, ApiError> {
    let response = state.auth().login(&state.db().pool, payload).await?;
    Ok(ResponseJson(ApiResponse::success(response)))
}

/// GET /api/auth/me
pub async fn me(Extension(user): Extension<User>) -> ResponseJson<ApiResponse<User>> {
    ResponseJson(ApiResponse::success(user))
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}
