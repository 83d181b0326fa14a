mod common;

use std::sync::Arc;

use ticketgate_core::recovery::worker::RecoveryWorker;
use ticketgate_core::reservations::repository::{ReservationRepository, ReserveOutcome};
use ticketgate_core::telemetry::Counters;

const SECRET: &str = "test-signing-secret";

fn worker(pool: sqlx::PgPool) -> RecoveryWorker {
    RecoveryWorker::new(pool, SECRET.to_string(), 30, Arc::new(Counters::default()))
}

/// P5 - worker idempotence. A reservation past its TTL gets expired on the
/// first pass; running the same pass again must be a no-op, not a second
/// state transition or error.
#[sqlx::test(migrations = "./migrations")]
async fn expire_pass_is_idempotent(pool: sqlx::PgPool) {
    let (event_id, tier_id) = common::seed_event_and_tier(&pool, 10, 6).await;
    let user = common::random_user();
    let reservation_repo = ReservationRepository::new(pool.clone());

    let reservation_id = match reservation_repo.reserve(event_id, tier_id, &user, 1, 6, 0).await.unwrap() {
        ReserveOutcome::Success(r) => r.id,
        other => panic!("expected a successful hold, got {:?}", other),
    };
    sqlx::query("UPDATE reservations SET expires_at = now() - interval '1 second' WHERE id = $1")
        .bind(reservation_id)
        .execute(&pool)
        .await
        .unwrap();

    let worker = worker(pool.clone());
    worker.expire_stale_holds().await.unwrap();

    let status: String = sqlx::query_scalar("SELECT status FROM reservations WHERE id = $1")
        .bind(reservation_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "expired");

    // Second pass touches nothing: status stays 'expired', no error.
    worker.expire_stale_holds().await.unwrap();
    let status_again: String = sqlx::query_scalar("SELECT status FROM reservations WHERE id = $1")
        .bind(reservation_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status_again, "expired");
}

/// P5 - a paid order missing tickets gets topped up to exactly its
/// quantity; a second pass over the same order adds nothing further.
#[sqlx::test(migrations = "./migrations")]
async fn repair_pass_tops_up_shortfall_then_is_a_noop(pool: sqlx::PgPool) {
    let (event_id, tier_id) = common::seed_event_and_tier(&pool, 10, 6).await;
    let user = common::random_user();
    let reservation_repo = ReservationRepository::new(pool.clone());

    let reservation_id = match reservation_repo.reserve(event_id, tier_id, &user, 3, 6, 180).await.unwrap() {
        ReserveOutcome::Success(r) => r.id,
        other => panic!("expected a successful hold, got {:?}", other),
    };

    let session_id = uuid::Uuid::new_v4();
    sqlx::query(
        r#"INSERT INTO checkout_sessions (id, reservation_id, idempotency_key, status, created_at)
           VALUES ($1, $2, $3, 'completed', now())"#,
    )
    .bind(session_id)
    .bind(reservation_id)
    .bind(format!("idem-{}", session_id))
    .execute(&pool)
    .await
    .unwrap();

    let order_id = uuid::Uuid::new_v4();
    sqlx::query(
        r#"INSERT INTO orders (id, session_id, reservation_id, event_id, tier_id, user_id, quantity, total_price_cents, status, created_at)
           VALUES ($1, $2, $3, $4, $5, $6, 3, 75.00, 'paid', now())"#,
    )
    .bind(order_id)
    .bind(session_id)
    .bind(reservation_id)
    .bind(event_id)
    .bind(tier_id)
    .bind(&user)
    .execute(&pool)
    .await
    .unwrap();

    let worker = worker(pool.clone());
    worker.repair_missing_tickets().await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE order_id = $1")
        .bind(order_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 3);

    worker.repair_missing_tickets().await.unwrap();
    let count_again: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE order_id = $1")
        .bind(order_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count_again, 3);
}
