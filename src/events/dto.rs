/**
 * DOMAIN LAYER - Data Transfer Objects
 *
 * Event/Tier DTOs: The contracts between layers
 */

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub venue: String,
    pub starts_at: DateTime<Utc>,
    pub on_sale_at: DateTime<Utc>,
    pub status: String,
    pub paused: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tier {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub price_cents: Decimal,
    pub capacity: i32,
    pub per_user_limit: i32,
}

#[derive(Debug, Serialize)]
pub struct TierAvailability {
    pub tier_id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub reserved: i64,
    pub sold: i64,
    pub available: i64,
}

#[derive(Debug, Serialize)]
pub struct EventAvailability {
    pub event_id: Uuid,
    pub tiers: Vec<TierAvailability>,
}

#[derive(Debug, Serialize)]
pub struct AdminEventStatus {
    pub event: Event,
    pub tiers: Vec<TierAvailability>,
    pub reservations_active: i64,
    pub reservations_expired: i64,
    pub reservations_converted: i64,
    pub reservations_canceled: i64,
    pub orders_paid: i64,
    pub tickets_issued: i64,
}
