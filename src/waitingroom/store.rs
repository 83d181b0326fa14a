/**
 * REPOSITORY LAYER - Ephemeral Store Access
 *
 * QueueStore: The Redis-backed waiting room - join order, token liveness,
 * admission grants, and the wave cursor
 *
 * Architecture Layer: Repository (Layer 5)
 * Dependencies: Redis
 *
 * Key schema:
 *   queue:{event_id}          sorted set, member=token, score=join epoch millis
 *   queue_token:{event_id}:{token}  string, TTL=token_ttl, value=identity
 *   access:{event_id}:{token}      string, TTL=admission_ttl, value="1"
 *   wave:{event_id}            hash { end, last } - cursor state
 *
 * Positions are derived from ZSET rank. A token's liveness record expiring
 * does not remove it from the sorted set immediately - a stale member can
 * inflate the position of everyone behind it until it is lazily reaped on
 * the next status() poll that discovers it. This is the documented
 * trade-off: join order is stable per-token but not strictly fair under
 * interleaved joins and expirations.
 */

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

const WAVE_SCRIPT: &str = r#"
local key = KEYS[1]
local total = tonumber(ARGV[1])
local wave_size = tonumber(ARGV[2])
local wave_interval = tonumber(ARGV[3])
local now = tonumber(ARGV[4])

local vals = redis.call('HMGET', key, 'end', 'last')
local end_ = tonumber(vals[1])
local last = tonumber(vals[2])

if end_ == nil then
    end_ = math.min(total, wave_size)
    last = now
    redis.call('HSET', key, 'end', end_, 'last', last)
elseif total > end_ and (now - last) >= wave_interval then
    end_ = math.min(total, end_ + wave_size)
    last = now
    redis.call('HSET', key, 'end', end_, 'last', last)
end

return end_
"#;

#[derive(Clone)]
pub struct QueueStore {
    redis: ConnectionManager,
}

impl QueueStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn queue_key(event_id: &str) -> String {
        format!("queue:{}", event_id)
    }

    fn token_key(event_id: &str, token: &str) -> String {
        format!("queue_token:{}:{}", event_id, token)
    }

    fn access_key(event_id: &str, token: &str) -> String {
        format!("access:{}:{}", event_id, token)
    }

    fn wave_key(event_id: &str) -> String {
        format!("wave:{}", event_id)
    }

    /// Mints a queue entry: registers the token's liveness record and adds
    /// it to the join-ordered sorted set. `join_score` is the join instant
    /// in epoch milliseconds, passed in so the service (not the store)
    /// is the source of "now".
    pub async fn join(
        &self,
        event_id: &str,
        token: &str,
        identity: &str,
        join_score: f64,
        token_ttl_secs: u64,
    ) -> Result<(), redis::RedisError> {
        let mut conn = self.redis.clone();
        let _: () = conn
            .set_ex(Self::token_key(event_id, token), identity, token_ttl_secs)
            .await?;
        let _: () = conn
            .zadd(Self::queue_key(event_id), token, join_score)
            .await?;
        Ok(())
    }

    /// None if the token's liveness record is absent or expired.
    pub async fn token_alive(&self, event_id: &str, token: &str) -> Result<bool, redis::RedisError> {
        let mut conn = self.redis.clone();
        let exists: bool = conn.exists(Self::token_key(event_id, token)).await?;
        Ok(exists)
    }

    /// 1-indexed position in the join-ordered queue, or None if the token
    /// was never enqueued (already reaped, or never joined).
    pub async fn position(&self, event_id: &str, token: &str) -> Result<Option<u64>, redis::RedisError> {
        let mut conn = self.redis.clone();
        let rank: Option<u64> = conn.zrank(Self::queue_key(event_id), token).await?;
        Ok(rank.map(|r| r + 1))
    }

    pub async fn total(&self, event_id: &str) -> Result<u64, redis::RedisError> {
        let mut conn = self.redis.clone();
        conn.zcard(Self::queue_key(event_id)).await
    }

    /// Lazily reaps a dead token from the ordered set once its liveness
    /// record is found to be gone.
    pub async fn reap(&self, event_id: &str, token: &str) -> Result<(), redis::RedisError> {
        let mut conn = self.redis.clone();
        let _: () = conn.zrem(Self::queue_key(event_id), token).await?;
        Ok(())
    }

    /// Atomically initialises or ratchets the wave cursor forward. Returns
    /// the cursor's current `wave_end` after the call. Safe to call
    /// concurrently from many status() polls - the script body runs as a
    /// single Redis operation.
    pub async fn advance_wave(
        &self,
        event_id: &str,
        total: u64,
        wave_size: u64,
        wave_interval_secs: u64,
        now_epoch_secs: i64,
    ) -> Result<u64, redis::RedisError> {
        let mut conn = self.redis.clone();
        let script = Script::new(WAVE_SCRIPT);
        script
            .key(Self::wave_key(event_id))
            .arg(total)
            .arg(wave_size)
            .arg(wave_interval_secs)
            .arg(now_epoch_secs)
            .invoke_async(&mut conn)
            .await
    }

    pub async fn grant_access(
        &self,
        event_id: &str,
        token: &str,
        admission_ttl_secs: u64,
    ) -> Result<(), redis::RedisError> {
        let mut conn = self.redis.clone();
        let _: () = conn
            .set_ex(Self::access_key(event_id, token), "1", admission_ttl_secs)
            .await?;
        Ok(())
    }

    pub async fn has_access(&self, event_id: &str, token: &str) -> Result<bool, redis::RedisError> {
        let mut conn = self.redis.clone();
        conn.exists(Self::access_key(event_id, token)).await
    }

    /// Admin reset: drops the queue and wave cursor for an event. Live
    /// token/access keys expire on their own TTLs.
    pub async fn clear(&self, event_id: &str) -> Result<(), redis::RedisError> {
        let mut conn = self.redis.clone();
        let _: () = conn.del(Self::queue_key(event_id)).await?;
        let _: () = conn.del(Self::wave_key(event_id)).await?;
        Ok(())
    }
}
