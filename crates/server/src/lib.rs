use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use db::DBService;
use services::services::{auth::AuthService, config::Config};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{info, warn};
use utils::jwt::JwtKeys;

pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    config: Arc<Config>,
    auth: AuthService,
}

impl AppState {
    pub fn new(db: DBService, config: Config) -> Self {
        let auth = AuthService::new(JwtKeys::new(&config.jwt_secret, config.jwt_ttl));
        Self {
            db,
            config: Arc::new(config),
            auth,
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }
}

pub fn build_app(state: AppState) -> Router {
    let mut app = Router::new()
        .nest("/api", routes::router(&state))
        .layer(cors_layer(&state.config().cors_origins))
        .layer(TraceLayer::new_for_http());

    if let Some(dist) = &state.config().frontend_dist {
        info!(path = %dist.display(), "Serving frontend");
        let spa = ServeDir::new(dist).not_found_service(ServeFile::new(dist.join("index.html")));
        app = app.fallback_service(spa);
    }

    app.with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
