/**
 * INFRASTRUCTURE LAYER - Background Worker
 *
 * RecoveryWorker: runs on a fixed interval, entirely independent of any
 * request. Two idempotent passes:
 *
 *   Pass A - expire stale holds: reservations whose TTL elapsed without a
 *   checkout ever completing. A single UPDATE ... RETURNING, safe to run
 *   every cycle and safe to run concurrently with request handlers - no
 *   counter bookkeeping needed because availability is always computed
 *   live from the reservations/orders tables.
 *
 *   Pass B - repair missing tickets: paid orders whose ticket count fell
 *   short of their quantity (a confirm() that committed the order but
 *   crashed before finishing ticket generation). Locks the order row,
 *   tops up the shortfall, no-ops once fully ticketed.
 *
 * This worker is the only thing in the system that moves a reservation to
 * `expired` without the user lifting a finger.
 */

use std::sync::Arc;
use std::time::Duration;

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::signing;
use crate::telemetry::Counters;

pub struct RecoveryWorker {
    pool: PgPool,
    qr_signing_secret: String,
    interval_secs: u64,
    counters: Arc<Counters>,
}

impl RecoveryWorker {
    pub fn new(pool: PgPool, qr_signing_secret: String, interval_secs: u64, counters: Arc<Counters>) -> Self {
        Self { pool, qr_signing_secret, interval_secs, counters }
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(self.interval_secs));
            loop {
                ticker.tick().await;
                if let Err(err) = self.expire_stale_holds().await {
                    tracing::error!(error = %err, "recovery worker: pass A failed");
                }
                if let Err(err) = self.repair_missing_tickets().await {
                    tracing::error!(error = %err, "recovery worker: pass B failed");
                }
            }
        })
    }

    /// Exposed (not just invoked from the tick loop) so callers can drive
    /// a pass on demand, e.g. in tests.
    pub async fn expire_stale_holds(&self) -> Result<(), sqlx::Error> {
        let rows = sqlx::query(
            "UPDATE reservations SET status = 'expired' WHERE status = 'active' AND expires_at <= now() RETURNING id",
        )
        .fetch_all(&self.pool)
        .await?;

        if !rows.is_empty() {
            tracing::info!(count = rows.len(), "recovery worker: expired stale holds");
        }
        Ok(())
    }

    pub async fn repair_missing_tickets(&self) -> Result<(), sqlx::Error> {
        let short_orders = sqlx::query(
            r#"SELECT o.id, o.event_id, o.tier_id, o.user_id, o.quantity
               FROM orders o
               LEFT JOIN (SELECT order_id, COUNT(*) as count FROM tickets GROUP BY order_id) tc
                 ON tc.order_id = o.id
               WHERE o.status = 'paid' AND COALESCE(tc.count, 0) < o.quantity"#,
        )
        .fetch_all(&self.pool)
        .await?;

        for row in short_orders {
            let order_id: Uuid = row.get("id");
            let event_id: Uuid = row.get("event_id");
            let tier_id: Uuid = row.get("tier_id");
            let user_id: String = row.get("user_id");
            let order_quantity: i32 = row.get("quantity");

            self.repair_order(order_id, event_id, tier_id, &user_id, order_quantity as i64).await?;
        }

        Ok(())
    }

    async fn repair_order(
        &self,
        order_id: Uuid,
        event_id: Uuid,
        tier_id: Uuid,
        user_id: &str,
        order_quantity: i64,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Lock the order row so two overlapping worker runs can't both
        // try to top up the same shortfall.
        sqlx::query("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_one(&mut *tx)
            .await?;

        let current: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE order_id = $1")
            .bind(order_id)
            .fetch_one(&mut *tx)
            .await?;

        // current..order_quantity, not current..(current+shortfall): the
        // pre-lock SELECT's shortfall is stale if another pass already
        // topped this order up while we waited for the lock.
        let mut repaired = 0u64;

        for _ in current..order_quantity {
            for _ in 0..5 {
                let code = signing::generate_code();
                let qr_sig = signing::sign(&self.qr_signing_secret, &code, order_id, event_id);

                let inserted = sqlx::query(
                    r#"INSERT INTO tickets (id, order_id, event_id, tier_id, user_id, code, qr_sig, created_at)
                       VALUES ($1, $2, $3, $4, $5, $6, $7, now())
                       ON CONFLICT (code) DO NOTHING"#,
                )
                .bind(Uuid::new_v4())
                .bind(order_id)
                .bind(event_id)
                .bind(tier_id)
                .bind(user_id)
                .bind(&code)
                .bind(&qr_sig)
                .execute(&mut *tx)
                .await?;

                if inserted.rows_affected() > 0 {
                    repaired += 1;
                    break;
                }
            }
        }

        tx.commit().await?;

        if repaired > 0 {
            for _ in 0..repaired {
                Counters::inc(&self.counters.tickets_recovered);
            }
            tracing::info!(order_id = %order_id, repaired, "recovery worker: repaired missing tickets");
        }

        Ok(())
    }
}

