/**
 * DOMAIN LAYER - Error Handling
 *
 * AppError: The diplomat of failures - translating problems into HTTP responses
 *
 * Architecture Layer: Domain (Layer 4)
 * Dependencies: None (pure domain logic)
 * Responsibility: Define all possible errors, map to HTTP status codes
 *
 * Why custom errors? Because "database error" tells you nothing
 * "INSUFFICIENT_INVENTORY" tells you exactly what went wrong
 */

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/**
 * AppError: Every way things can go wrong in the ticket gate
 *
 * Each variant represents a specific business error
 * Using thiserror crate for automatic Error trait implementation
 */
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("rate limited")]
    RateLimited { retry_after_seconds: u64 },

    #[error("not admitted")]
    NotAdmitted,

    #[error("sales paused")]
    SalesPaused,

    #[error("purchase limit exceeded")]
    PurchaseLimitExceeded { already_purchased: i64, requested: i64 },

    #[error("per-tier limit exceeded")]
    PerTierLimitExceeded,

    #[error("double hold")]
    DoubleHold,

    #[error("insufficient inventory")]
    InsufficientInventory,

    #[error("reservation expired or invalid")]
    ReservationExpiredOrInvalid,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("internal error: {0}")]
    Internal(String),
}

/**
 * ErrorBody: Standard error response format
 *
 * Consistent structure across all endpoints
 * Frontend knows exactly what to expect
 */
#[derive(Serialize)]
struct ErrorBody {
    status: String,
    error: ErrorDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<Value>,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, context) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unauthorized".to_string(),
                None,
            ),
            AppError::RateLimited { retry_after_seconds } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many requests".to_string(),
                Some(serde_json::json!({ "retryAfterSeconds": retry_after_seconds })),
            ),
            AppError::NotAdmitted => (
                StatusCode::FORBIDDEN,
                "NOT_ADMITTED",
                "No admission grant for this event".to_string(),
                None,
            ),
            AppError::SalesPaused => (
                StatusCode::FORBIDDEN,
                "SALES_PAUSED",
                "Sales are currently paused for this event".to_string(),
                None,
            ),
            AppError::PurchaseLimitExceeded { already_purchased, requested } => (
                StatusCode::FORBIDDEN,
                "PURCHASE_LIMIT_EXCEEDED",
                "Purchase limit exceeded".to_string(),
                Some(serde_json::json!({
                    "alreadyPurchased": already_purchased,
                    "requested": requested,
                })),
            ),
            AppError::PerTierLimitExceeded => (
                StatusCode::FORBIDDEN,
                "PER_TIER_LIMIT_EXCEEDED",
                "Requested quantity exceeds the per-user tier limit".to_string(),
                None,
            ),
            AppError::DoubleHold => (
                StatusCode::CONFLICT,
                "DOUBLE_HOLD",
                "An active reservation already exists for this user and event".to_string(),
                None,
            ),
            AppError::InsufficientInventory => (
                StatusCode::CONFLICT,
                "INSUFFICIENT_INVENTORY",
                "Not enough tickets remaining in this tier".to_string(),
                None,
            ),
            AppError::ReservationExpiredOrInvalid => (
                StatusCode::CONFLICT,
                "RESERVATION_EXPIRED_OR_INVALID",
                "Reservation is expired or no longer active".to_string(),
                None,
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Cache(err) => {
                tracing::error!(error = %err, "cache error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(%msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            status: "error".to_string(),
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
            context,
        };

        (status, Json(body)).into_response()
    }
}

/// Shorthand for Result<T, AppError>
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversell_and_double_hold_map_to_conflict() {
        assert_eq!(AppError::InsufficientInventory.into_response().status(), StatusCode::CONFLICT);
        assert_eq!(AppError::DoubleHold.into_response().status(), StatusCode::CONFLICT);
        assert_eq!(AppError::ReservationExpiredOrInvalid.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn admission_and_pause_failures_map_to_forbidden() {
        assert_eq!(AppError::NotAdmitted.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::SalesPaused.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::PurchaseLimitExceeded { already_purchased: 6, requested: 1 }.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn rate_limited_maps_to_too_many_requests() {
        let resp = AppError::RateLimited { retry_after_seconds: 5 }.into_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(AppError::NotFound("event".into()).into_response().status(), StatusCode::NOT_FOUND);
    }
}
