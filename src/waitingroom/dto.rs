/**
 * DOMAIN LAYER - Data Transfer Objects
 *
 * Waiting room DTOs: join tickets and the two shapes status() can answer with
 */

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "state")]
pub enum StatusView {
    #[serde(rename = "waiting")]
    Waiting {
        on_sale_at: DateTime<Utc>,
        seconds_until_on_sale: i64,
    },
    #[serde(rename = "sale_open")]
    SaleOpen {
        on_sale_at: DateTime<Utc>,
        position: u64,
        total: u64,
        can_enter: bool,
        eta_seconds: u64,
        paused: bool,
    },
}
