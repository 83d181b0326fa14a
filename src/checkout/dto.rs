/**
 * DOMAIN LAYER - Data Transfer Objects
 *
 * Checkout DTOs: sessions, orders, tickets, and the request shapes for the
 * two-phase create/confirm flow
 */

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reservations::dto::Reservation;

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub idempotency_key: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub session_id: Uuid,
    pub reservation_id: Uuid,
    pub event_id: Uuid,
    pub tier_id: Uuid,
    pub user_id: String,
    pub quantity: i32,
    pub total_price_cents: Decimal,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ticket {
    pub id: Uuid,
    pub order_id: Uuid,
    pub event_id: Uuid,
    pub tier_id: Uuid,
    pub user_id: String,
    pub code: String,
    pub qr_sig: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub reservation_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
    Success,
    Fail,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub checkout_id: Uuid,
    #[serde(rename = "simulate")]
    pub payment_outcome: PaymentOutcome,
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub session: Session,
    pub reservation: Reservation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickets: Option<Vec<Ticket>>,
}
