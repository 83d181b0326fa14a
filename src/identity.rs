/**
 * DOMAIN LAYER - Identity Extraction
 *
 * Identity: The trusted caller - lifted straight out of the X-User-Id
 * header
 *
 * Architecture Layer: Domain (Layer 4)
 * Responsibility: Pull the caller's identity out of the request
 *
 * This service trusts the header outright. An upstream gateway is assumed
 * to have already authenticated the caller and forwarded their identity -
 * this service does not verify signatures or sessions, it only reads what
 * it is told.
 */

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

pub struct Identity(pub String);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get("X-User-Id")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or(AppError::Unauthorized)?;

        Ok(Identity(value.to_string()))
    }
}
