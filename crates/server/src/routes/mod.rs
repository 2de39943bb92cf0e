use axum::Router;

use crate::AppState;

pub mod auth;
pub mod canvas;
pub mod deploy;
pub mod health;
pub mod move_code;

/// All `/api` routes. Everything except health and login/register sits
/// behind [`crate::middleware::require_auth`].
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router(state))
        .merge(auth::router(state))
        .merge(canvas::router(state))
        .merge(move_code::router(state))
        .merge(deploy::router(state))
}
