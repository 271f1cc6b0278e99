//! Cinecatalog backend entry point.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinecatalog::config::Config;
use cinecatalog::{AppState, build_app, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinecatalog=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("Starting Cinecatalog");

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let pool = db::connect(&config.database_url, config.database_max_connections).await?;
    tracing::info!("Database connected");

    let addr = config.bind_address();
    let state = AppState::initialize(config, pool).await?;
    tracing::info!(entities = state.registry.len(), "Schema ready");

    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
