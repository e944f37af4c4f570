//! Server setup and initialization
//!
//! Wires configuration, the database and Redis pools, repositories, and the
//! service context into a running Axum application.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use parley_cache::{RedisPool, RedisPoolConfig, RedisPresenceStore, RedisPublisher};
use parley_common::{AppConfig, AppError};
use parley_db::{
    create_pool, run_migrations, DatabaseConfig, PgCallRepository, PgConversationRepository,
    PgMessageRepository, PgParticipantRepository, PgReactionRepository, PgUserRepository,
    PgVisibilityRepository,
};
use parley_service::ServiceContext;

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = create_router();
    let router = apply_middleware(router, &state.config().cors);
    router.with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    // Create database pool
    info!("Connecting to PostgreSQL...");
    let db_config = DatabaseConfig::from(&config.database);
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool, Path::new("./crates/parley-db/migrations"))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    // Create Redis pool
    info!("Connecting to Redis...");
    let redis_pool = RedisPool::new(RedisPoolConfig::from(&config.redis))
        .map_err(|e| AppError::Cache(e.to_string()))?;
    info!("Redis connection established");

    // Wire the service context
    let service_context = ServiceContext::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(PgConversationRepository::new(pool.clone())),
        Arc::new(PgParticipantRepository::new(pool.clone())),
        Arc::new(PgVisibilityRepository::new(pool.clone())),
        Arc::new(PgMessageRepository::new(pool.clone())),
        Arc::new(PgReactionRepository::new(pool.clone())),
        Arc::new(PgCallRepository::new(pool)),
        Arc::new(RedisPresenceStore::new(redis_pool.clone())),
        Arc::new(RedisPublisher::new(redis_pool)),
    );

    Ok(AppState::new(service_context, config))
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    let state = create_app_state(config).await?;
    let app = create_app(state);

    run_server(app, addr).await
}
