/**
 * CONTROLLER LAYER - HTTP Endpoints
 *
 * Reservation handlers: place a hold against a tier, or look up the
 * caller's current one
 *
 * Architecture Layer: Controller (Layer 1)
 * Dependencies: ReservationService (Use Case Layer)
 */

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::Result;
use crate::identity::Identity;
use crate::telemetry::Counters;

use super::dto::ReserveRequest;
use super::service::ReservationService;

pub struct ReservationState {
    pub service: ReservationService,
    pub counters: Arc<Counters>,
}

#[derive(Deserialize)]
pub struct LookupQuery {
    #[allow(dead_code)]
    pub token: Option<String>,
}

pub async fn reserve(
    State(state): State<Arc<ReservationState>>,
    Path(event_id): Path<Uuid>,
    identity: Identity,
    Json(body): Json<ReserveRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let reservation = state
        .service
        .reserve(event_id, body.tier_id, &identity.0, body.quantity, &body.token, &state.counters)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "data": reservation })),
    ))
}

pub async fn lookup(
    State(state): State<Arc<ReservationState>>,
    Path(event_id): Path<Uuid>,
    identity: Identity,
    Query(_query): Query<LookupQuery>,
) -> Result<Json<serde_json::Value>> {
    let reservation = state.service.lookup_active(event_id, &identity.0).await?;
    Ok(Json(json!({ "status": "success", "data": reservation })))
}
