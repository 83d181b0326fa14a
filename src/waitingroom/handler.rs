/**
 * CONTROLLER LAYER - HTTP Endpoints
 *
 * Waiting room handlers: join the queue and poll status
 *
 * Architecture Layer: Controller (Layer 1)
 * Dependencies: QueueService (Use Case Layer)
 */

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::identity::Identity;
use crate::ratelimit::RateLimiter;
use crate::telemetry::Counters;

use super::service::QueueService;

pub struct WaitingRoomState {
    pub service: QueueService,
    pub rate_limiter: RateLimiter,
    pub counters: Arc<Counters>,
}

#[derive(Deserialize)]
pub struct StatusQuery {
    pub token: String,
}

pub async fn join(
    State(state): State<Arc<WaitingRoomState>>,
    Path(event_id): Path<Uuid>,
    identity: Identity,
) -> Result<Json<serde_json::Value>> {
    let allowed = state
        .rate_limiter
        .check("waitingroom:join", &format!("{}:{}", event_id, identity.0), 10, 60)
        .await;
    if !allowed {
        Counters::inc(&state.counters.rate_limit_hits);
        return Err(AppError::RateLimited { retry_after_seconds: 60 });
    }

    let token = state.service.join(event_id, &identity.0, &state.counters).await?;
    Ok(Json(json!({ "status": "success", "data": { "token": token } })))
}

pub async fn status(
    State(state): State<Arc<WaitingRoomState>>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<serde_json::Value>> {
    let view = state.service.status(event_id, &query.token).await?;
    Ok(Json(json!({ "status": "success", "data": view })))
}

pub async fn clear(
    State(state): State<Arc<WaitingRoomState>>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    state.service.clear(event_id).await?;
    Ok(Json(json!({ "status": "success", "data": { "cleared": true } })))
}
