/**
 * REPOSITORY LAYER - Data Access
 *
 * TicketRepository: Joins a buyer's tickets against event and tier names
 * for display
 *
 * Architecture Layer: Repository (Layer 5)
 * Dependencies: Database (Postgres)
 */

use sqlx::{PgPool, Row};

use super::dto::MyTicket;

#[derive(Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<MyTicket>, sqlx::Error> {
        let rows = sqlx::query(
            r#"SELECT
                t.id, t.order_id, t.event_id, e.name as event_name,
                t.tier_id, tr.name as tier_name, t.code, t.qr_sig, t.created_at
            FROM tickets t
            JOIN events e ON e.id = t.event_id
            JOIN tiers tr ON tr.id = t.tier_id
            WHERE t.user_id = $1
            ORDER BY t.created_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| MyTicket {
                id: r.get("id"),
                order_id: r.get("order_id"),
                event_id: r.get("event_id"),
                event_name: r.get("event_name"),
                tier_id: r.get("tier_id"),
                tier_name: r.get("tier_name"),
                code: r.get("code"),
                qr_sig: r.get("qr_sig"),
                verified: true,
                issued_at: r.get("created_at"),
            })
            .collect())
    }
}
