use chrono::{Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Seeds an on-sale event with a single tier and returns their ids.
pub async fn seed_event_and_tier(pool: &PgPool, capacity: i32, per_user_limit: i32) -> (Uuid, Uuid) {
    let event_id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"INSERT INTO events (id, name, venue, starts_at, on_sale_at, status, paused)
           VALUES ($1, 'Test Show', 'Test Venue', $2, $3, 'on_sale', false)"#,
    )
    .bind(event_id)
    .bind(now + Duration::hours(2))
    .bind(now - Duration::hours(1))
    .execute(pool)
    .await
    .expect("seed event");

    let tier_id = Uuid::new_v4();
    sqlx::query(
        r#"INSERT INTO tiers (id, event_id, name, price_cents, capacity, per_user_limit)
           VALUES ($1, $2, 'General', $3, $4, $5)"#,
    )
    .bind(tier_id)
    .bind(event_id)
    .bind(Decimal::new(2500, 2))
    .bind(capacity)
    .bind(per_user_limit)
    .execute(pool)
    .await
    .expect("seed tier");

    (event_id, tier_id)
}

pub fn random_user() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(100_000..999_999);
    format!("user-{}", suffix)
}
