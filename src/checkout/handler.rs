/**
 * CONTROLLER LAYER - HTTP Endpoints
 *
 * Checkout handlers: create a session, then confirm with a payment
 * outcome
 *
 * Architecture Layer: Controller (Layer 1)
 * Dependencies: CheckoutService (Use Case Layer)
 */

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::identity::Identity;
use crate::telemetry::Counters;

use super::dto::{ConfirmRequest, CreateSessionRequest};
use super::service::{CheckoutService, ConfirmResult, CreateSessionResult};

pub struct CheckoutState {
    pub service: CheckoutService,
    pub counters: Arc<Counters>,
}

pub async fn create_session(
    State(state): State<Arc<CheckoutState>>,
    identity: Identity,
    headers: HeaderMap,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let idempotency_key = headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation("missing Idempotency-Key header".into()))?;

    let result = state
        .service
        .create_session(&identity.0, body.reservation_id, idempotency_key, &state.counters)
        .await?;

    let (status, session, idempotent) = match result {
        CreateSessionResult::Created(session) => (StatusCode::CREATED, session, false),
        CreateSessionResult::Replayed(session) => (StatusCode::OK, session, true),
    };

    Ok((
        status,
        Json(json!({ "status": "success", "data": session, "idempotent": idempotent })),
    ))
}

pub async fn confirm(
    State(state): State<Arc<CheckoutState>>,
    identity: Identity,
    Json(body): Json<ConfirmRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let result = state
        .service
        .confirm(body.checkout_id, body.payment_outcome, &identity.0, &state.counters)
        .await?;

    let (status, response) = match result {
        ConfirmResult::Created(response) => (StatusCode::CREATED, response),
        ConfirmResult::Replayed(response) => (StatusCode::OK, response),
    };

    Ok((status, Json(json!({ "status": "success", "data": response }))))
}
