/**
 * INFRASTRUCTURE LAYER - Configuration
 *
 * Config: The settings manager - where environment variables become useful data
 *
 * Architecture Layer: Infrastructure (Layer 6)
 * Dependencies: Environment variables
 * Responsibility: Load, parse, and provide configuration to the application
 *
 * Why a Config struct? Because scattered env::var() calls are a maintenance nightmare
 * Centralize configuration - change once, affect everywhere
 */

use std::env;

/**
 * Config: All the settings the ticket gate needs to run
 *
 * Loaded once at startup, cloned and passed to services
 * Clone is cheap because strings are reference-counted where it matters
 */
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub redis_url: String,
    pub qr_signing_secret: String,

    pub token_ttl_secs: u64,
    pub admission_ttl_secs: u64,
    pub wave_size: u64,
    pub wave_interval_secs: u64,
    pub reservation_ttl_secs: u64,
    pub per_event_purchase_limit: i64,
    pub recovery_interval_secs: u64,
}

impl Config {
    /**
     * Load configuration from environment variables
     *
     * Reads from .env file (via dotenvy) or system environment
     * Provides sensible defaults where possible
     *
     * Pattern: unwrap_or_else for defaults, unwrap_or for empty strings
     */
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8081".to_string())
                .parse()
                .unwrap_or(8081),

            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| String::new()),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| String::new()),

            // Signing secret for ticket QR codes. Empty disables signature
            // generation only in the sense that every ticket shares the same
            // (empty-key) MAC - never set this to empty in production.
            qr_signing_secret: env::var("QR_SIGNING_SECRET").unwrap_or_else(|_| String::new()),

            token_ttl_secs: env_u64("TOKEN_TTL_SECS", 3600),
            admission_ttl_secs: env_u64("ADMISSION_TTL_SECS", 180),
            wave_size: env_u64("WAVE_SIZE", 100),
            wave_interval_secs: env_u64("WAVE_INTERVAL_SECS", 30),
            reservation_ttl_secs: env_u64("RESERVATION_TTL_SECS", 180),
            per_event_purchase_limit: env::var("PER_EVENT_PURCHASE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(6),
            recovery_interval_secs: env_u64("RECOVERY_INTERVAL_SECS", 60),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
