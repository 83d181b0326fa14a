/**
 * USE CASE LAYER - Business Logic
 *
 * ReservationService: Checks the admission grant, then hands off to the
 * repository's locked transaction for everything that has to be atomic
 *
 * Architecture Layer: Service (Layer 3)
 * Dependencies: ReservationRepository, QueueService
 */

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::telemetry::Counters;
use crate::waitingroom::service::QueueService;

use super::dto::Reservation;
use super::repository::{ReservationRepository, ReserveOutcome};

#[derive(Clone)]
pub struct ReservationService {
    repo: ReservationRepository,
    queue: QueueService,
    per_event_purchase_limit: i64,
    reservation_ttl_secs: i64,
}

impl ReservationService {
    pub fn new(
        repo: ReservationRepository,
        queue: QueueService,
        per_event_purchase_limit: i64,
        reservation_ttl_secs: i64,
    ) -> Self {
        Self {
            repo,
            queue,
            per_event_purchase_limit,
            reservation_ttl_secs,
        }
    }

    pub async fn reserve(
        &self,
        event_id: Uuid,
        tier_id: Uuid,
        user_id: &str,
        quantity: i32,
        token: &str,
        counters: &Counters,
    ) -> Result<Reservation> {
        if quantity < 1 {
            return Err(AppError::Validation("quantity must be at least 1".into()));
        }

        if !self.queue.has_admission(event_id, token).await? {
            return Err(AppError::NotAdmitted);
        }

        let outcome = self
            .repo
            .reserve(
                event_id,
                tier_id,
                user_id,
                quantity,
                self.per_event_purchase_limit,
                self.reservation_ttl_secs,
            )
            .await?;

        match outcome {
            ReserveOutcome::Success(reservation) => {
                Counters::inc(&counters.reservations_created);
                Ok(reservation)
            }
            ReserveOutcome::EventNotFound => Err(AppError::NotFound("event or tier not found".into())),
            ReserveOutcome::SalesPaused => Err(AppError::SalesPaused),
            ReserveOutcome::PurchaseLimitExceeded { already_committed } => {
                Counters::inc(&counters.purchase_limit_hits);
                Err(AppError::PurchaseLimitExceeded {
                    already_purchased: already_committed,
                    requested: quantity as i64,
                })
            }
            ReserveOutcome::PerTierLimitExceeded => Err(AppError::PerTierLimitExceeded),
            ReserveOutcome::DoubleHold => Err(AppError::DoubleHold),
            ReserveOutcome::InsufficientInventory => {
                Counters::inc(&counters.oversell_attempts);
                Err(AppError::InsufficientInventory)
            }
        }
    }

    pub async fn lookup_active(&self, event_id: Uuid, user_id: &str) -> Result<Option<Reservation>> {
        Ok(self.repo.lookup_active(event_id, user_id).await?)
    }
}
