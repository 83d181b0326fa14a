/**
 * REPOSITORY LAYER - Data Access
 *
 * ReservationRepository: The serialisation point. Every hold against a
 * tier is created inside a transaction that locks the tier row, which is
 * what makes "no oversell" an invariant instead of a hope.
 *
 * Architecture Layer: Repository (Layer 5)
 * Dependencies: Database (Postgres)
 */

use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::dto::Reservation;

#[derive(Debug)]
pub enum ReserveOutcome {
    Success(Reservation),
    EventNotFound,
    SalesPaused,
    PurchaseLimitExceeded { already_committed: i64 },
    PerTierLimitExceeded,
    DoubleHold,
    InsufficientInventory,
}

#[derive(Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Everything that must be true atomically lives inside one
    /// transaction, serialised on the tier row lock:
    ///   - event exists, is not draft, is not paused
    ///   - user isn't already over the per-event purchase cap
    ///   - requested quantity fits the tier's per-user limit
    ///   - user doesn't already hold an active, unexpired reservation
    ///   - tier has enough remaining capacity
    #[allow(clippy::too_many_arguments)]
    pub async fn reserve(
        &self,
        event_id: Uuid,
        tier_id: Uuid,
        user_id: &str,
        quantity: i32,
        per_event_purchase_limit: i64,
        reservation_ttl_secs: i64,
    ) -> Result<ReserveOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let event_row = sqlx::query("SELECT status, paused FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(event_row) = event_row else {
            tx.rollback().await?;
            return Ok(ReserveOutcome::EventNotFound);
        };

        let status: String = event_row.get("status");
        let paused: bool = event_row.get("paused");
        if status == "draft" {
            tx.rollback().await?;
            return Ok(ReserveOutcome::EventNotFound);
        }
        if paused {
            tx.rollback().await?;
            return Ok(ReserveOutcome::SalesPaused);
        }

        // Serialisation point for I1 (no oversell). Every concurrent
        // reserve() against this tier queues here.
        let tier_row = sqlx::query(
            "SELECT capacity, per_user_limit FROM tiers WHERE id = $1 AND event_id = $2 FOR UPDATE",
        )
        .bind(tier_id)
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(tier_row) = tier_row else {
            tx.rollback().await?;
            return Ok(ReserveOutcome::EventNotFound);
        };

        let capacity: i32 = tier_row.get("capacity");
        let per_user_limit: i32 = tier_row.get("per_user_limit");

        if quantity > per_user_limit {
            tx.rollback().await?;
            return Ok(ReserveOutcome::PerTierLimitExceeded);
        }

        let already_committed: i64 = sqlx::query_scalar(
            r#"SELECT
                COALESCE((SELECT SUM(quantity) FROM reservations
                          WHERE event_id = $1 AND user_id = $2 AND status = 'active' AND expires_at > now()), 0)
              + COALESCE((SELECT SUM(quantity) FROM orders
                          WHERE event_id = $1 AND user_id = $2 AND status = 'paid'), 0)"#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_committed + quantity as i64 > per_event_purchase_limit {
            tx.rollback().await?;
            return Ok(ReserveOutcome::PurchaseLimitExceeded { already_committed });
        }

        let existing_hold: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM reservations WHERE event_id = $1 AND user_id = $2 AND status = 'active' AND expires_at > now() LIMIT 1",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing_hold.is_some() {
            tx.rollback().await?;
            return Ok(ReserveOutcome::DoubleHold);
        }

        let committed_in_tier: i64 = sqlx::query_scalar(
            r#"SELECT
                COALESCE((SELECT SUM(quantity) FROM reservations
                          WHERE tier_id = $1 AND status = 'active' AND expires_at > now()), 0)
              + COALESCE((SELECT SUM(quantity) FROM orders
                          WHERE tier_id = $1 AND status = 'paid'), 0)"#,
        )
        .bind(tier_id)
        .fetch_one(&mut *tx)
        .await?;

        if capacity as i64 - committed_in_tier < quantity as i64 {
            tx.rollback().await?;
            return Ok(ReserveOutcome::InsufficientInventory);
        }

        let expires_at: DateTime<Utc> = Utc::now() + Duration::seconds(reservation_ttl_secs);
        let row = sqlx::query(
            r#"INSERT INTO reservations (id, event_id, tier_id, user_id, quantity, status, expires_at, created_at)
               VALUES ($1, $2, $3, $4, $5, 'active', $6, now())
               RETURNING id, event_id, tier_id, user_id, quantity, status, expires_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(tier_id)
        .bind(user_id)
        .bind(quantity)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ReserveOutcome::Success(Reservation {
            id: row.get("id"),
            event_id: row.get("event_id"),
            tier_id: row.get("tier_id"),
            user_id: row.get("user_id"),
            quantity: row.get("quantity"),
            status: row.get("status"),
            expires_at: row.get("expires_at"),
        }))
    }

    pub async fn lookup_active(
        &self,
        event_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let row = sqlx::query(
            r#"SELECT id, event_id, tier_id, user_id, quantity, status, expires_at
               FROM reservations
               WHERE event_id = $1 AND user_id = $2 AND status = 'active' AND expires_at > now()
               LIMIT 1"#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Reservation {
            id: r.get("id"),
            event_id: r.get("event_id"),
            tier_id: r.get("tier_id"),
            user_id: r.get("user_id"),
            quantity: r.get("quantity"),
            status: r.get("status"),
            expires_at: r.get("expires_at"),
        }))
    }

    pub async fn get(&self, reservation_id: Uuid) -> Result<Option<Reservation>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, event_id, tier_id, user_id, quantity, status, expires_at FROM reservations WHERE id = $1",
        )
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Reservation {
            id: r.get("id"),
            event_id: r.get("event_id"),
            tier_id: r.get("tier_id"),
            user_id: r.get("user_id"),
            quantity: r.get("quantity"),
            status: r.get("status"),
            expires_at: r.get("expires_at"),
        }))
    }
}
