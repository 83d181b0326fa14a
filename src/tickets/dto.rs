/**
 * DOMAIN LAYER - Data Transfer Objects
 *
 * MyTicket: a buyer's view of an issued ticket, with verification baked
 * into the payload so a client never has to ask a second endpoint
 */

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct MyTicket {
    pub id: Uuid,
    pub order_id: Uuid,
    pub event_id: Uuid,
    pub event_name: String,
    pub tier_id: Uuid,
    pub tier_name: String,
    pub code: String,
    pub qr_sig: String,
    pub verified: bool,
    pub issued_at: DateTime<Utc>,
}
