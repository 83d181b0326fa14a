/**
 * USE CASE LAYER - Business Logic
 *
 * EventService: Read-side logic for the buyer-facing catalog and the
 * organiser-facing admin status view
 *
 * Architecture Layer: Service (Layer 3)
 * Dependencies: EventRepository (Repository Layer)
 */

use uuid::Uuid;

use crate::error::{AppError, Result};

use super::dto::{AdminEventStatus, Event, EventAvailability, Tier};
use super::repository::EventRepository;

#[derive(Clone)]
pub struct EventService {
    repo: EventRepository,
}

impl EventService {
    pub fn new(repo: EventRepository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &EventRepository {
        &self.repo
    }

    pub async fn list_events(&self) -> Result<Vec<Event>> {
        Ok(self.repo.list_visible().await?)
    }

    pub async fn get_event(&self, event_id: Uuid) -> Result<Event> {
        self.repo
            .get_visible(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("event not found".into()))
    }

    pub async fn list_tiers(&self, event_id: Uuid) -> Result<Vec<Tier>> {
        // Confirm the event itself is visible before leaking its tiers.
        self.get_event(event_id).await?;
        Ok(self.repo.list_tiers(event_id).await?)
    }

    pub async fn availability(&self, event_id: Uuid) -> Result<EventAvailability> {
        self.get_event(event_id).await?;
        let tiers = self.repo.tier_availability(event_id).await?;
        Ok(EventAvailability { event_id, tiers })
    }

    pub async fn pause(&self, event_id: Uuid) -> Result<()> {
        self.set_paused(event_id, true).await
    }

    pub async fn resume(&self, event_id: Uuid) -> Result<()> {
        self.set_paused(event_id, false).await
    }

    async fn set_paused(&self, event_id: Uuid, paused: bool) -> Result<()> {
        // Admin operations act on any event, including drafts.
        self.repo
            .get_any(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("event not found".into()))?;

        let updated = self.repo.set_paused(event_id, paused).await?;
        if !updated {
            return Err(AppError::NotFound("event not found".into()));
        }
        Ok(())
    }

    pub async fn admin_status(&self, event_id: Uuid) -> Result<AdminEventStatus> {
        let event = self
            .repo
            .get_any(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("event not found".into()))?;

        let tiers = self.repo.tier_availability(event_id).await?;
        let (active, expired, converted, canceled) =
            self.repo.reservation_counts_by_status(event_id).await?;
        let (orders_paid, tickets_issued) = self.repo.order_and_ticket_counts(event_id).await?;

        Ok(AdminEventStatus {
            event,
            tiers,
            reservations_active: active,
            reservations_expired: expired,
            reservations_converted: converted,
            reservations_canceled: canceled,
            orders_paid,
            tickets_issued,
        })
    }
}
