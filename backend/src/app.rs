//! Application state and HTTP router construction.
//!
//! Used by [main](crate) and by the integration tests to build the Axum app.

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::Config;
use crate::db;
use crate::entities;
use crate::geo::GeometryFactory;
use crate::orm::{EntityRegistry, Mapper};

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub mapper: Mapper,
    pub registry: Arc<EntityRegistry>,
}

impl AppState {
    /// Build the registry and geometry from `config`, then sync the schema
    /// (and seeds, if enabled) on `pool`.
    pub async fn initialize(config: Config, pool: SqlitePool) -> Result<Self> {
        let registry = entities::registry()?;
        db::prepare(&pool, &registry, config.seed_data).await?;

        let mapper = Mapper::new(GeometryFactory::new(config.geometry_srid));

        Ok(Self {
            config: Arc::new(config),
            pool,
            mapper,
            registry: Arc::new(registry),
        })
    }
}

/// Build the full Axum router: health probes, /api, and layers.
/// Returns Router<()> (state fully applied) for use with axum::serve.
pub fn build_app(state: AppState) -> Router<()> {
    Router::new()
        // Health endpoints (no auth required)
        .merge(api::health::router())
        .nest("/api", api::router())
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
