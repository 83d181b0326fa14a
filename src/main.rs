/**
 * INFRASTRUCTURE LAYER - Application Entry Point
 *
 * Main: The conductor - orchestrating all services and routes
 *
 * Architecture Layer: Infrastructure (Layer 6)
 * Responsibility: Application bootstrap, dependency injection, routing
 *
 * Startup Flow:
 * 1. Initialize logging (tracing)
 * 2. Load configuration from environment
 * 3. Create database connection pool and run migrations
 * 4. Create the Redis connection manager
 * 5. Build the router (see `router::build_router`)
 * 6. Start HTTP server
 */

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use ticketgate_core::{config, db, router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticketgate_core=info,tower_http=info".into()),
        )
        .init();

    dotenvy::dotenv().ok();

    let cfg = config::Config::from_env();

    let pool = if cfg.database_url.is_empty() {
        tracing::warn!("DATABASE_URL not set -- running without database");
        None
    } else {
        Some(db::create_pool(&cfg.database_url).await)
    };

    let redis = if cfg.redis_url.is_empty() {
        tracing::warn!("REDIS_URL not set -- running without cache");
        None
    } else {
        Some(db::create_redis(&cfg.redis_url).await)
    };

    let addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!("ticketgate-core starting on {}", addr);

    let app = match (pool, redis) {
        (Some(pool), Some(redis)) => router::build_router(pool, redis, cfg),
        _ => Router::new()
            .route("/health", get(|| async { "health-only mode: DATABASE_URL/REDIS_URL unset" }))
            .layer(CorsLayer::permissive()),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
