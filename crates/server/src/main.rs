use anyhow::Context;
use db::DBService;
use server::{AppState, build_app};
use services::services::config::Config;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    let db = DBService::new(&config.database_url)
        .await
        .context("failed to open database")?;

    let address = config.bind_address();
    let app = build_app(AppState::new(db, config));

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(address = %address, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
