use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use tracing::debug;

use crate::{AppState, error::ApiError};

/// Resolve `Authorization: Bearer <jwt>` to a [`db::models::user::User`] and
/// expose it to handlers as an `Extension`.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Ok(TypedHeader(Authorization(bearer))) = bearer else {
        debug!(path = %request.uri().path(), "Missing or malformed bearer token");
        return Err(ApiError::Unauthorized);
    };

    let user = state
        .auth()
        .authenticate(&state.db().pool, bearer.token())
        .await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
