use axum::{
    Extension, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::post,
};
use db::models::user::User;
use services::services::deploy::{DeployOutcome, DeployService};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::require_auth};

/// POST /api/deploy/deploy
/// Write the caller's latest Move code to disk and run the publish command
pub async fn deploy(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<ApiResponse<DeployOutcome>>, ApiError> {
    let outcome = DeployService::deploy(&state.db().pool, &state.config().deploy, user.id).await?;
    let message = outcome.message.clone();
    Ok(ResponseJson(ApiResponse::success_with_message(
        outcome, message,
    )))
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/deploy/deploy", post(deploy))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}
