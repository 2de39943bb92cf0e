use axum::{
    Extension, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    canvas::{Canvas, CanvasSummary, CreateCanvas, UpdateCanvas},
    user::User,
};
use services::services::canvas::CanvasService;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, extract::Json, middleware::require_auth};

// Malformed ids cannot name a stored canvas.
fn parse_canvas_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Canvas not found"))
}

/// POST /api/canvas
pub async fn create_canvas(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateCanvas>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Canvas>>), ApiError> {
    let canvas = CanvasService::create(&state.db().pool, user.id, payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(canvas))))
}

/// GET /api/canvas
pub async fn list_canvases(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<ApiResponse<Vec<CanvasSummary>>>, ApiError> {
    let canvases = CanvasService::list(&state.db().pool, user.id).await?;
    Ok(ResponseJson(ApiResponse::success(canvases)))
}

/// GET /api/canvas/{id}
pub async fn get_canvas(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Canvas>>, ApiError> {
    let canvas = CanvasService::get(&state.db().pool, user.id, parse_canvas_id(&id)?).await?;
    Ok(ResponseJson(ApiResponse::success(canvas)))
}

/// PUT /api/canvas/{id}
pub async fn update_canvas(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCanvas>,
) -> Result<ResponseJson<ApiResponse<Canvas>>, ApiError> {
    let id = parse_canvas_id(&id)?;
    let canvas = CanvasService::update(&state.db().pool, user.id, id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(canvas)))
}

/// DELETE /api/canvas/{id}
pub async fn delete_canvas(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let id = parse_canvas_id(&id)?;
    CanvasService::delete(&state.db().pool, user.id, id).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Canvas removed",
    )))
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/canvas", get(list_canvases).post(create_canvas))
        .route(
            "/canvas/{id}",
            get(get_canvas).put(update_canvas).delete(delete_canvas),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}
