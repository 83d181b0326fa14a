/**
 * USE CASE LAYER - Business Logic
 *
 * CheckoutService: Rate limits the two checkout endpoints and translates
 * the repository's transactional outcomes into API errors
 *
 * Architecture Layer: Service (Layer 3)
 * Dependencies: CheckoutRepository, RateLimiter
 */

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::ratelimit::RateLimiter;
use crate::telemetry::Counters;

use super::dto::{ConfirmResponse, PaymentOutcome, Session};
use super::repository::{CheckoutRepository, ConfirmOutcome, CreateSessionOutcome};

/// Whether `create_session` minted a fresh row or echoed back an existing
/// one - the handler needs this to pick 201 vs 200 and set the replay flag.
pub enum CreateSessionResult {
    Created(Session),
    Replayed(Session),
}

/// Whether `confirm` settled this checkout for the first time or is
/// replaying an already-completed one.
pub enum ConfirmResult {
    Created(ConfirmResponse),
    Replayed(ConfirmResponse),
}

#[derive(Clone)]
pub struct CheckoutService {
    repo: CheckoutRepository,
    rate_limiter: RateLimiter,
    reservation_ttl_secs: i64,
    qr_signing_secret: String,
}

impl CheckoutService {
    pub fn new(
        repo: CheckoutRepository,
        rate_limiter: RateLimiter,
        reservation_ttl_secs: i64,
        qr_signing_secret: String,
    ) -> Self {
        Self {
            repo,
            rate_limiter,
            reservation_ttl_secs,
            qr_signing_secret,
        }
    }

    pub async fn create_session(
        &self,
        user_id: &str,
        reservation_id: Uuid,
        idempotency_key: &str,
        counters: &Counters,
    ) -> Result<CreateSessionResult> {
        if !self
            .rate_limiter
            .check("checkout:create_session", user_id, 5, 60)
            .await
        {
            Counters::inc(&counters.rate_limit_hits);
            return Err(AppError::RateLimited { retry_after_seconds: 60 });
        }

        let outcome = self
            .repo
            .create_session(user_id, reservation_id, idempotency_key, self.reservation_ttl_secs)
            .await?;

        match outcome {
            CreateSessionOutcome::Created(session) => Ok(CreateSessionResult::Created(session)),
            CreateSessionOutcome::Idempotent(session) => Ok(CreateSessionResult::Replayed(session)),
            CreateSessionOutcome::ReservationNotFound => {
                Err(AppError::NotFound("reservation not found".into()))
            }
            CreateSessionOutcome::ReservationInvalid => Err(AppError::ReservationExpiredOrInvalid),
        }
    }

    pub async fn confirm(
        &self,
        checkout_id: Uuid,
        payment_outcome: PaymentOutcome,
        user_id: &str,
        counters: &Counters,
    ) -> Result<ConfirmResult> {
        if !self.rate_limiter.check("checkout:confirm", user_id, 10, 60).await {
            Counters::inc(&counters.rate_limit_hits);
            return Err(AppError::RateLimited { retry_after_seconds: 60 });
        }

        let success = matches!(payment_outcome, PaymentOutcome::Success);
        let outcome = self.repo.confirm(checkout_id, success, &self.qr_signing_secret).await?;

        match outcome {
            ConfirmOutcome::AlreadyCompleted { session, reservation, order, tickets } => {
                Ok(ConfirmResult::Replayed(ConfirmResponse {
                    session,
                    reservation,
                    order: Some(order),
                    tickets: Some(tickets),
                }))
            }
            ConfirmOutcome::Success { session, reservation, order, tickets } => {
                Counters::inc(&counters.confirmations_success);
                Counters::inc(&counters.orders_created);
                Ok(ConfirmResult::Created(ConfirmResponse {
                    session,
                    reservation,
                    order: Some(order),
                    tickets: Some(tickets),
                }))
            }
            ConfirmOutcome::Failed { session, reservation } => {
                Counters::inc(&counters.confirmations_fail);
                Ok(ConfirmResult::Created(ConfirmResponse {
                    session,
                    reservation,
                    order: None,
                    tickets: None,
                }))
            }
            ConfirmOutcome::ReservationExpiredOrInvalid { .. } => {
                Counters::inc(&counters.confirmations_fail);
                Err(AppError::ReservationExpiredOrInvalid)
            }
            ConfirmOutcome::StateMismatch => Err(AppError::Conflict("checkout session is not pending".into())),
            ConfirmOutcome::NotFound => Err(AppError::NotFound("checkout session not found".into())),
        }
    }
}
