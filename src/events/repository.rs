/**
 * REPOSITORY LAYER - Data Access
 *
 * EventRepository: The gatekeeper to the events and tiers tables
 *
 * Architecture Layer: Repository (Layer 5)
 * Dependencies: Database (Infrastructure Layer 6)
 * Responsibility: CRUD and read-aggregate queries, no business logic
 */

use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::dto::{Event, Tier, TierAvailability};

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Events visible to buyers - drafts never leave the organiser's view.
    pub async fn list_visible(&self) -> Result<Vec<Event>, sqlx::Error> {
        let rows = sqlx::query(
            r#"SELECT id, name, venue, starts_at, on_sale_at, status, paused
            FROM events WHERE status != 'draft' ORDER BY starts_at ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_event).collect())
    }

    pub async fn get_visible(&self, event_id: Uuid) -> Result<Option<Event>, sqlx::Error> {
        let row = sqlx::query(
            r#"SELECT id, name, venue, starts_at, on_sale_at, status, paused
            FROM events WHERE id = $1 AND status != 'draft'"#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_event))
    }

    pub async fn get_any(&self, event_id: Uuid) -> Result<Option<Event>, sqlx::Error> {
        let row = sqlx::query(
            r#"SELECT id, name, venue, starts_at, on_sale_at, status, paused
            FROM events WHERE id = $1"#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_event))
    }

    pub async fn list_tiers(&self, event_id: Uuid) -> Result<Vec<Tier>, sqlx::Error> {
        let rows = sqlx::query(
            r#"SELECT id, event_id, name, price_cents, capacity, per_user_limit
            FROM tiers WHERE event_id = $1 ORDER BY name ASC"#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_tier).collect())
    }

    /// Approximate availability breakdown, read without locking - for
    /// display only. The authoritative check happens inside the reservation
    /// engine's locked transaction.
    pub async fn tier_availability(&self, event_id: Uuid) -> Result<Vec<TierAvailability>, sqlx::Error> {
        let rows = sqlx::query(
            r#"SELECT
                t.id as tier_id, t.name, t.capacity,
                COALESCE((SELECT SUM(r.quantity) FROM reservations r
                          WHERE r.tier_id = t.id AND r.status = 'active' AND r.expires_at > now()), 0) as reserved,
                COALESCE((SELECT SUM(o.quantity) FROM orders o
                          WHERE o.tier_id = t.id AND o.status = 'paid'), 0) as sold
            FROM tiers t WHERE t.event_id = $1 ORDER BY t.name ASC"#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| {
                let capacity: i32 = r.get("capacity");
                let reserved: i64 = r.get("reserved");
                let sold: i64 = r.get("sold");
                TierAvailability {
                    tier_id: r.get("tier_id"),
                    name: r.get("name"),
                    capacity,
                    reserved,
                    sold,
                    available: (capacity as i64 - reserved - sold).max(0),
                }
            })
            .collect())
    }

    pub async fn set_paused(&self, event_id: Uuid, paused: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE events SET paused = $2 WHERE id = $1")
            .bind(event_id)
            .bind(paused)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn reservation_counts_by_status(
        &self,
        event_id: Uuid,
    ) -> Result<(i64, i64, i64, i64), sqlx::Error> {
        let row = sqlx::query(
            r#"SELECT
                COUNT(*) FILTER (WHERE status = 'active' AND expires_at > now()) as active,
                COUNT(*) FILTER (WHERE status = 'expired' OR (status = 'active' AND expires_at <= now())) as expired,
                COUNT(*) FILTER (WHERE status = 'converted') as converted,
                COUNT(*) FILTER (WHERE status = 'canceled') as canceled
            FROM reservations WHERE event_id = $1"#,
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((row.get("active"), row.get("expired"), row.get("converted"), row.get("canceled")))
    }

    pub async fn order_and_ticket_counts(&self, event_id: Uuid) -> Result<(i64, i64), sqlx::Error> {
        let orders: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE event_id = $1 AND status = 'paid'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        let tickets: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?;

        Ok((orders, tickets))
    }
}

fn row_to_event(row: &sqlx::postgres::PgRow) -> Event {
    Event {
        id: row.get("id"),
        name: row.get("name"),
        venue: row.get("venue"),
        starts_at: row.get("starts_at"),
        on_sale_at: row.get("on_sale_at"),
        status: row.get("status"),
        paused: row.get("paused"),
    }
}

fn row_to_tier(row: &sqlx::postgres::PgRow) -> Tier {
    Tier {
        id: row.get("id"),
        event_id: row.get("event_id"),
        name: row.get("name"),
        price_cents: row.get::<Decimal, _>("price_cents"),
        capacity: row.get("capacity"),
        per_user_limit: row.get("per_user_limit"),
    }
}
