/**
 * CONTROLLER LAYER - HTTP Endpoints
 *
 * Event handlers: buyer-facing catalog reads plus the organiser's
 * pause/resume/status admin surface
 *
 * Architecture Layer: Controller (Layer 1)
 * Dependencies: EventService (Use Case Layer)
 */

use std::sync::Arc;

use axum::{extract::{Path, State}, Json};
use serde_json::json;
use uuid::Uuid;

use crate::error::Result;

use super::service::EventService;

pub async fn list_events(State(service): State<Arc<EventService>>) -> Result<Json<serde_json::Value>> {
    let events = service.list_events().await?;
    Ok(Json(json!({ "status": "success", "data": events })))
}

pub async fn get_event(
    State(service): State<Arc<EventService>>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let event = service.get_event(event_id).await?;
    let tiers = service.list_tiers(event_id).await?;
    Ok(Json(json!({ "status": "success", "data": { "event": event, "tiers": tiers } })))
}

pub async fn get_availability(
    State(service): State<Arc<EventService>>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let availability = service.availability(event_id).await?;
    Ok(Json(json!({ "status": "success", "data": availability })))
}

pub async fn pause_event(
    State(service): State<Arc<EventService>>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    service.pause(event_id).await?;
    Ok(Json(json!({ "status": "success", "data": { "paused": true } })))
}

pub async fn resume_event(
    State(service): State<Arc<EventService>>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    service.resume(event_id).await?;
    Ok(Json(json!({ "status": "success", "data": { "paused": false } })))
}

pub async fn admin_status(
    State(service): State<Arc<EventService>>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let status = service.admin_status(event_id).await?;
    Ok(Json(json!({ "status": "success", "data": status })))
}
