/**
 * REPOSITORY LAYER - Data Access
 *
 * CheckoutRepository: The two-phase state machine's data access - session
 * creation keyed on a unique idempotency key, and the confirm transaction
 * that locks the reservation row and either mints an order plus tickets
 * or fails it.
 *
 * Architecture Layer: Repository (Layer 5)
 * Dependencies: Database (Postgres)
 */

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::reservations::dto::Reservation;
use crate::signing;

use super::dto::{Order, Session, Ticket};

pub enum CreateSessionOutcome {
    Created(Session),
    Idempotent(Session),
    ReservationNotFound,
    ReservationInvalid,
}

pub enum ConfirmOutcome {
    AlreadyCompleted {
        session: Session,
        reservation: Reservation,
        order: Order,
        tickets: Vec<Ticket>,
    },
    Success {
        session: Session,
        reservation: Reservation,
        order: Order,
        tickets: Vec<Ticket>,
    },
    Failed {
        session: Session,
        reservation: Reservation,
    },
    ReservationExpiredOrInvalid {
        session: Session,
        reservation: Reservation,
    },
    StateMismatch,
    NotFound,
}

#[derive(Clone)]
pub struct CheckoutRepository {
    pool: PgPool,
}

impl CheckoutRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_session_by_idempotency_key(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, reservation_id, idempotency_key, status, created_at FROM checkout_sessions WHERE idempotency_key = $1",
        )
        .bind(idempotency_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_session))
    }

    pub async fn find_pending_session_for_reservation(
        &self,
        reservation_id: Uuid,
    ) -> Result<Option<Session>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, reservation_id, idempotency_key, status, created_at FROM checkout_sessions WHERE reservation_id = $1 AND status = 'pending' LIMIT 1",
        )
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_session))
    }

    pub async fn create_session(
        &self,
        user_id: &str,
        reservation_id: Uuid,
        idempotency_key: &str,
        reservation_ttl_secs: i64,
    ) -> Result<CreateSessionOutcome, sqlx::Error> {
        if let Some(existing) = self.find_session_by_idempotency_key(idempotency_key).await? {
            return Ok(CreateSessionOutcome::Idempotent(existing));
        }

        let reservation_row = sqlx::query(
            "SELECT id, event_id, tier_id, user_id, quantity, status, expires_at FROM reservations WHERE id = $1",
        )
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(reservation_row) = reservation_row else {
            return Ok(CreateSessionOutcome::ReservationNotFound);
        };

        let status: String = reservation_row.get("status");
        let expires_at: DateTime<Utc> = reservation_row.get("expires_at");
        let owner: String = reservation_row.get("user_id");

        if status != "active" || expires_at <= Utc::now() || owner != user_id {
            return Ok(CreateSessionOutcome::ReservationInvalid);
        }

        if let Some(existing) = self.find_pending_session_for_reservation(reservation_id).await? {
            return Ok(CreateSessionOutcome::Created(existing));
        }

        let new_expiry = Utc::now() + Duration::seconds(reservation_ttl_secs);
        sqlx::query("UPDATE reservations SET expires_at = $2 WHERE id = $1 AND status = 'active'")
            .bind(reservation_id)
            .bind(new_expiry)
            .execute(&self.pool)
            .await?;

        let insert = sqlx::query(
            r#"INSERT INTO checkout_sessions (id, reservation_id, idempotency_key, status, created_at)
               VALUES ($1, $2, $3, 'pending', now())
               ON CONFLICT (idempotency_key) DO NOTHING
               RETURNING id, reservation_id, idempotency_key, status, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(reservation_id)
        .bind(idempotency_key)
        .fetch_optional(&self.pool)
        .await?;

        match insert {
            Some(row) => Ok(CreateSessionOutcome::Created(row_to_session(&row))),
            // Lost the race to a concurrent identical request - fall back
            // to whatever it inserted.
            None => {
                let existing = self.find_session_by_idempotency_key(idempotency_key).await?;
                match existing {
                    Some(session) => Ok(CreateSessionOutcome::Idempotent(session)),
                    None => Ok(CreateSessionOutcome::ReservationInvalid),
                }
            }
        }
    }

    pub async fn confirm(
        &self,
        checkout_id: Uuid,
        success: bool,
        qr_signing_secret: &str,
    ) -> Result<ConfirmOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let session_row = sqlx::query(
            "SELECT id, reservation_id, idempotency_key, status, created_at FROM checkout_sessions WHERE id = $1",
        )
        .bind(checkout_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(session_row) = session_row else {
            tx.rollback().await?;
            return Ok(ConfirmOutcome::NotFound);
        };
        let session = row_to_session(&session_row);

        let reservation_row = sqlx::query(
            "SELECT id, event_id, tier_id, user_id, quantity, status, expires_at FROM reservations WHERE id = $1",
        )
        .bind(session.reservation_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(reservation_row) = reservation_row else {
            tx.rollback().await?;
            return Ok(ConfirmOutcome::NotFound);
        };
        let reservation = row_to_reservation(&reservation_row);

        if let Some(existing_order) = self.fetch_order_for_session(&mut tx, session.id).await? {
            let tickets = self.fetch_tickets_for_order(&mut tx, existing_order.id).await?;
            tx.commit().await?;
            return Ok(ConfirmOutcome::AlreadyCompleted {
                session,
                reservation,
                order: existing_order,
                tickets,
            });
        }

        if session.status != "pending" {
            tx.rollback().await?;
            return Ok(ConfirmOutcome::StateMismatch);
        }

        // Serialisation point for this hold's final disposition.
        let locked = sqlx::query(
            "SELECT id, event_id, tier_id, user_id, quantity, status, expires_at FROM reservations WHERE id = $1 FOR UPDATE",
        )
        .bind(reservation.id)
        .fetch_one(&mut *tx)
        .await?;
        let reservation = row_to_reservation(&locked);

        // A concurrent confirm() may have won the race for this same
        // session while we were blocked acquiring the reservation lock
        // above - re-check for its order now that we're serialised,
        // rather than trusting the pre-lock check at the top.
        if let Some(existing_order) = self.fetch_order_for_session(&mut tx, session.id).await? {
            let tickets = self.fetch_tickets_for_order(&mut tx, existing_order.id).await?;
            let session_row = sqlx::query(
                "SELECT id, reservation_id, idempotency_key, status, created_at FROM checkout_sessions WHERE id = $1",
            )
            .bind(session.id)
            .fetch_one(&mut *tx)
            .await?;
            tx.commit().await?;
            return Ok(ConfirmOutcome::AlreadyCompleted {
                session: row_to_session(&session_row),
                reservation,
                order: existing_order,
                tickets,
            });
        }

        if reservation.status == "active" && reservation.expires_at <= Utc::now() {
            sqlx::query("UPDATE reservations SET status = 'expired' WHERE id = $1")
                .bind(reservation.id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE checkout_sessions SET status = 'expired' WHERE id = $1")
                .bind(session.id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            return Ok(ConfirmOutcome::ReservationExpiredOrInvalid {
                session: Session { status: "expired".into(), ..session },
                reservation: Reservation { status: "expired".into(), ..reservation },
            });
        }

        if reservation.status != "active" {
            sqlx::query("UPDATE checkout_sessions SET status = 'failed' WHERE id = $1")
                .bind(session.id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            return Ok(ConfirmOutcome::ReservationExpiredOrInvalid {
                session: Session { status: "failed".into(), ..session },
                reservation,
            });
        }

        if !success {
            sqlx::query("UPDATE checkout_sessions SET status = 'failed' WHERE id = $1")
                .bind(session.id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE reservations SET status = 'canceled' WHERE id = $1")
                .bind(reservation.id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            return Ok(ConfirmOutcome::Failed {
                session: Session { status: "failed".into(), ..session },
                reservation: Reservation { status: "canceled".into(), ..reservation },
            });
        }

        let tier_price: Decimal =
            sqlx::query_scalar("SELECT price_cents FROM tiers WHERE id = $1")
                .bind(reservation.tier_id)
                .fetch_one(&mut *tx)
                .await?;
        let total_price_cents = tier_price * Decimal::from(reservation.quantity);

        let order_row = sqlx::query(
            r#"INSERT INTO orders (id, session_id, reservation_id, event_id, tier_id, user_id, quantity, total_price_cents, status, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'paid', now())
               RETURNING id, session_id, reservation_id, event_id, tier_id, user_id, quantity, total_price_cents, status"#,
        )
        .bind(Uuid::new_v4())
        .bind(session.id)
        .bind(reservation.id)
        .bind(reservation.event_id)
        .bind(reservation.tier_id)
        .bind(&reservation.user_id)
        .bind(reservation.quantity)
        .bind(total_price_cents)
        .fetch_one(&mut *tx)
        .await?;
        let order = row_to_order(&order_row);

        let mut tickets = Vec::with_capacity(reservation.quantity as usize);
        for _ in 0..reservation.quantity {
            tickets.push(self.insert_ticket(&mut tx, &order, qr_signing_secret).await?);
        }

        sqlx::query("UPDATE checkout_sessions SET status = 'completed' WHERE id = $1")
            .bind(session.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE reservations SET status = 'converted' WHERE id = $1")
            .bind(reservation.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ConfirmOutcome::Success {
            session: Session { status: "completed".into(), ..session },
            reservation: Reservation { status: "converted".into(), ..reservation },
            order,
            tickets,
        })
    }

    /// Inserts one ticket, retrying with a fresh code on the vanishingly
    /// rare `code` collision. Bounded so a broken RNG can't spin forever.
    async fn insert_ticket(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order: &Order,
        qr_signing_secret: &str,
    ) -> Result<Ticket, sqlx::Error> {
        for _ in 0..5 {
            let code = signing::generate_code();
            let qr_sig = signing::sign(qr_signing_secret, &code, order.id, order.event_id);

            let row = sqlx::query(
                r#"INSERT INTO tickets (id, order_id, event_id, tier_id, user_id, code, qr_sig, created_at)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, now())
                   ON CONFLICT (code) DO NOTHING
                   RETURNING id, order_id, event_id, tier_id, user_id, code, qr_sig"#,
            )
            .bind(Uuid::new_v4())
            .bind(order.id)
            .bind(order.event_id)
            .bind(order.tier_id)
            .bind(&order.user_id)
            .bind(&code)
            .bind(&qr_sig)
            .fetch_optional(&mut **tx)
            .await?;

            if let Some(row) = row {
                return Ok(row_to_ticket(&row));
            }
        }

        Err(sqlx::Error::Protocol("exhausted ticket code retry budget".into()))
    }

    async fn fetch_order_for_session(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        session_id: Uuid,
    ) -> Result<Option<Order>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, session_id, reservation_id, event_id, tier_id, user_id, quantity, total_price_cents, status FROM orders WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.as_ref().map(row_to_order))
    }

    async fn fetch_tickets_for_order(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, order_id, event_id, tier_id, user_id, code, qr_sig FROM tickets WHERE order_id = $1 ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows.iter().map(row_to_ticket).collect())
    }
}

fn row_to_session(row: &sqlx::postgres::PgRow) -> Session {
    Session {
        id: row.get("id"),
        reservation_id: row.get("reservation_id"),
        idempotency_key: row.get("idempotency_key"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}

fn row_to_reservation(row: &sqlx::postgres::PgRow) -> Reservation {
    Reservation {
        id: row.get("id"),
        event_id: row.get("event_id"),
        tier_id: row.get("tier_id"),
        user_id: row.get("user_id"),
        quantity: row.get("quantity"),
        status: row.get("status"),
        expires_at: row.get("expires_at"),
    }
}

fn row_to_order(row: &sqlx::postgres::PgRow) -> Order {
    Order {
        id: row.get("id"),
        session_id: row.get("session_id"),
        reservation_id: row.get("reservation_id"),
        event_id: row.get("event_id"),
        tier_id: row.get("tier_id"),
        user_id: row.get("user_id"),
        quantity: row.get("quantity"),
        total_price_cents: row.get("total_price_cents"),
        status: row.get("status"),
    }
}

fn row_to_ticket(row: &sqlx::postgres::PgRow) -> Ticket {
    Ticket {
        id: row.get("id"),
        order_id: row.get("order_id"),
        event_id: row.get("event_id"),
        tier_id: row.get("tier_id"),
        user_id: row.get("user_id"),
        code: row.get("code"),
        qr_sig: row.get("qr_sig"),
    }
}
