/**
 * INFRASTRUCTURE LAYER - Database Connection
 *
 * Database Pool: The connection manager - because opening connections is expensive
 *
 * Architecture Layer: Infrastructure (Layer 6)
 * Dependencies: PostgreSQL (via SQLx), Redis (via the redis crate)
 * Responsibility: Create and configure connection pools for both stores
 *
 * Why connection pooling? Because:
 * 1. Opening TCP connections is slow (handshake, auth, etc)
 * 2. Databases have connection limits
 * 3. Reusing connections is way faster
 */

use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/**
 * Create a PostgreSQL connection pool and run pending migrations.
 *
 * Configuration:
 * - max_connections: 20 (how many concurrent connections allowed)
 * - min_connections: 5 (keep this many warm and ready)
 *
 * Pool behavior:
 * - Request comes in -> grab connection from pool
 * - Do database work -> return connection to pool
 * - If pool empty -> wait for available connection
 * - If all connections busy -> queue the request
 */
pub async fn create_pool(database_url: &str) -> PgPool {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    pool
}

/**
 * Create a multiplexed Redis connection manager.
 *
 * ConnectionManager transparently reconnects on failure and can be cloned
 * cheaply - every request holding a clone shares the same underlying
 * connection rather than opening a fresh TCP socket per call.
 */
pub async fn create_redis(redis_url: &str) -> ConnectionManager {
    let client = redis::Client::open(redis_url).expect("Invalid REDIS_URL");
    client
        .get_connection_manager()
        .await
        .expect("Failed to connect to Redis")
}
