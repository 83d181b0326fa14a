/**
 * INFRASTRUCTURE LAYER - Rate Limiting
 *
 * RateLimiter: The bouncer's stopwatch - counts requests in a sliding window
 *
 * Architecture Layer: Infrastructure (Layer 6)
 * Dependencies: Redis
 * Responsibility: Per-scope, per-key request counting with TTL-bounded windows
 *
 * Fail-open by design: if Redis is unreachable the limiter allows the
 * request through rather than denying it. A degraded cache should never
 * turn into a denial of service for buyers.
 */

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

pub struct RateLimiter {
    redis: ConnectionManager,
}

impl RateLimiter {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    /// Returns Ok(true) if the call is within the limit, Ok(false) if it
    /// should be rejected with `retry_after_seconds = window_secs`.
    /// Redis failures resolve to Ok(true) - fail open.
    pub async fn check(&self, scope: &str, key: &str, limit: u64, window_secs: u64) -> bool {
        let redis_key = format!("ratelimit:{}:{}", scope, key);
        let mut conn = self.redis.clone();

        let count: redis::RedisResult<u64> = conn.incr(&redis_key, 1).await;
        let count = match count {
            Ok(c) => c,
            Err(err) => {
                tracing::warn!(error = %err, scope, "rate limiter unreachable, failing open");
                return true;
            }
        };

        if count == 1 {
            // First hit in this window - arm the expiry.
            let _: redis::RedisResult<()> = conn.expire(&redis_key, window_secs as i64).await;
        }

        count <= limit
    }
}
