/**
 * CONTROLLER LAYER - HTTP Endpoints
 *
 * Ticket handlers: a buyer's own tickets
 *
 * Architecture Layer: Controller (Layer 1)
 * Dependencies: TicketService (Use Case Layer)
 */

use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::json;

use crate::error::Result;
use crate::identity::Identity;

use super::service::TicketService;

pub async fn my_tickets(
    State(service): State<Arc<TicketService>>,
    identity: Identity,
) -> Result<Json<serde_json::Value>> {
    let tickets = service.list_for_user(&identity.0).await?;
    Ok(Json(json!({ "status": "success", "data": tickets })))
}
