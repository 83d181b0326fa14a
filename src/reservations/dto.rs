/**
 * DOMAIN LAYER - Data Transfer Objects
 *
 * Reservation DTOs
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Reservation {
    pub id: Uuid,
    pub event_id: Uuid,
    pub tier_id: Uuid,
    pub user_id: String,
    pub quantity: i32,
    pub status: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    pub tier_id: Uuid,
    pub quantity: i32,
    pub token: String,
}
