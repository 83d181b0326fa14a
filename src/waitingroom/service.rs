/**
 * USE CASE LAYER - Business Logic
 *
 * QueueService: Join the line, poll your position, and get waved through
 * in order as the wave cursor advances
 *
 * Architecture Layer: Service (Layer 3)
 * Dependencies: QueueStore (Repository), EventRepository (Repository)
 */

use chrono::Utc;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::events::repository::EventRepository;
use crate::telemetry::Counters;

use super::dto::StatusView;
use super::store::QueueStore;

#[derive(Clone)]
pub struct QueueService {
    store: QueueStore,
    events: EventRepository,
    cfg: Config,
}

impl QueueService {
    pub fn new(store: QueueStore, events: EventRepository, cfg: Config) -> Self {
        Self { store, events, cfg }
    }

    pub async fn join(&self, event_id: Uuid, identity: &str, counters: &Counters) -> Result<String> {
        let event = self
            .events
            .get_any(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("event not found".into()))?;

        if event.status == "draft" {
            return Err(AppError::NotFound("event not found".into()));
        }

        let token = Uuid::new_v4().to_string();
        let join_score = Utc::now().timestamp_millis() as f64;

        self.store
            .join(
                &event_id.to_string(),
                &token,
                identity,
                join_score,
                self.cfg.token_ttl_secs,
            )
            .await?;

        Counters::inc(&counters.queue_joins);
        Ok(token)
    }

    pub async fn status(&self, event_id: Uuid, token: &str) -> Result<StatusView> {
        let event_key = event_id.to_string();

        let alive = self.store.token_alive(&event_key, token).await?;
        if !alive {
            self.store.reap(&event_key, token).await.ok();
            return Err(AppError::NotFound("invalid or expired queue token".into()));
        }

        let event = self
            .events
            .get_any(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("event not found".into()))?;

        let now = Utc::now();
        if now < event.on_sale_at {
            let seconds_until_on_sale = (event.on_sale_at - now).num_seconds().max(0);
            return Ok(StatusView::Waiting {
                on_sale_at: event.on_sale_at,
                seconds_until_on_sale,
            });
        }

        let position = self
            .store
            .position(&event_key, token)
            .await?
            .ok_or_else(|| AppError::NotFound("invalid or expired queue token".into()))?;
        let total = self.store.total(&event_key).await?;

        let wave_end = self
            .store
            .advance_wave(
                &event_key,
                total,
                self.cfg.wave_size,
                self.cfg.wave_interval_secs,
                now.timestamp(),
            )
            .await?;

        let can_enter = position <= wave_end && !event.paused;
        if can_enter {
            self.store
                .grant_access(&event_key, token, self.cfg.admission_ttl_secs)
                .await?;
        }

        let eta_seconds = if position <= wave_end {
            0
        } else {
            let waves_needed = (position - wave_end + self.cfg.wave_size - 1) / self.cfg.wave_size;
            waves_needed * self.cfg.wave_interval_secs
        };

        Ok(StatusView::SaleOpen {
            on_sale_at: event.on_sale_at,
            position,
            total,
            can_enter,
            eta_seconds,
            paused: event.paused,
        })
    }

    pub async fn has_admission(&self, event_id: Uuid, token: &str) -> Result<bool> {
        Ok(self.store.has_access(&event_id.to_string(), token).await?)
    }

    pub async fn clear(&self, event_id: Uuid) -> Result<()> {
        self.store.clear(&event_id.to_string()).await?;
        Ok(())
    }
}
