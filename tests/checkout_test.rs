mod common;

use ticketgate_core::checkout::repository::{CheckoutRepository, ConfirmOutcome, CreateSessionOutcome};
use ticketgate_core::reservations::repository::{ReservationRepository, ReserveOutcome};

const SECRET: &str = "test-signing-secret";

async fn make_active_reservation(pool: &sqlx::PgPool) -> (uuid::Uuid, uuid::Uuid, String) {
    let (event_id, tier_id) = common::seed_event_and_tier(pool, 50, 6).await;
    let user = common::random_user();
    let repo = ReservationRepository::new(pool.clone());
    let outcome = repo.reserve(event_id, tier_id, &user, 2, 6, 180).await.unwrap();
    let reservation_id = match outcome {
        ReserveOutcome::Success(r) => r.id,
        other => panic!("expected a successful hold, got {:?}", other),
    };
    (event_id, reservation_id, user)
}

/// P2 - session idempotency. Calling create_session twice with the same
/// idempotency key must return the same session id and must not create
/// a second row.
#[sqlx::test(migrations = "./migrations")]
async fn create_session_is_idempotent_on_key(pool: sqlx::PgPool) {
    let (_event_id, reservation_id, user) = make_active_reservation(&pool).await;
    let repo = CheckoutRepository::new(pool.clone());
    let key = "idem-key-1";

    let first = repo.create_session(&user, reservation_id, key, 180).await.unwrap();
    let session_id = match first {
        CreateSessionOutcome::Created(s) => s.id,
        other => panic!("expected Created on first call, got a different outcome variant"),
    };

    let second = repo.create_session(&user, reservation_id, key, 180).await.unwrap();
    let second_id = match second {
        CreateSessionOutcome::Idempotent(s) => s.id,
        CreateSessionOutcome::Created(s) => s.id,
        other => panic!("expected an idempotent echo, got a different outcome variant"),
    };

    assert_eq!(session_id, second_id);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM checkout_sessions WHERE idempotency_key = $1")
        .bind(key)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

/// P3 - confirmation idempotency. Confirming the same session twice with
/// success must produce exactly one order and exactly `quantity` tickets,
/// both calls returning the same order id.
#[sqlx::test(migrations = "./migrations")]
async fn double_confirm_success_yields_one_order_and_exact_ticket_count(pool: sqlx::PgPool) {
    let (_event_id, reservation_id, user) = make_active_reservation(&pool).await;
    let checkout_repo = CheckoutRepository::new(pool.clone());

    let session = match checkout_repo.create_session(&user, reservation_id, "idem-key-2", 180).await.unwrap() {
        CreateSessionOutcome::Created(s) => s,
        other => panic!("expected Created, got a different outcome variant"),
    };

    let first_confirm = checkout_repo.confirm(session.id, true, SECRET).await.unwrap();
    let (order_id, quantity) = match first_confirm {
        ConfirmOutcome::Success { order, tickets, .. } => (order.id, tickets.len()),
        other => panic!("expected Success, got a different outcome variant"),
    };
    assert_eq!(quantity, 2);

    let second_confirm = checkout_repo.confirm(session.id, true, SECRET).await.unwrap();
    match second_confirm {
        ConfirmOutcome::AlreadyCompleted { order, tickets, .. } => {
            assert_eq!(order.id, order_id);
            assert_eq!(tickets.len(), 2);
        }
        other => panic!("expected AlreadyCompleted on replay, got a different outcome variant"),
    }

    let ticket_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE order_id = $1")
        .bind(order_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(ticket_count, 2);
}

/// P4 - expired hold rejection. Confirming a session whose reservation
/// has already expired must fail with a terminal state and must not
/// create an order or any tickets.
#[sqlx::test(migrations = "./migrations")]
async fn confirm_after_expiry_fails_with_no_order(pool: sqlx::PgPool) {
    let (event_id, tier_id) = common::seed_event_and_tier(&pool, 50, 6).await;
    let user = common::random_user();
    let reservation_repo = ReservationRepository::new(pool.clone());

    // Reservation TTL of 0 seconds means it is already expired the
    // instant it is created.
    let reservation_id = match reservation_repo.reserve(event_id, tier_id, &user, 1, 6, 0).await.unwrap() {
        ReserveOutcome::Success(r) => r.id,
        other => panic!("expected a successful hold, got {:?}", other),
    };

    // Back-date expires_at further to remove any clock-skew flakiness.
    sqlx::query("UPDATE reservations SET expires_at = now() - interval '1 second' WHERE id = $1")
        .bind(reservation_id)
        .execute(&pool)
        .await
        .unwrap();

    let checkout_repo = CheckoutRepository::new(pool.clone());
    let session = match checkout_repo
        .create_session(&user, reservation_id, "idem-key-3", 180)
        .await
        .unwrap()
    {
        CreateSessionOutcome::Created(s) => s,
        CreateSessionOutcome::ReservationInvalid => {
            panic!("create_session should still see the reservation as active before expiry back-dating races it")
        }
        other => panic!("expected Created, got a different outcome variant: {:?}", std::mem::discriminant(&other)),
    };

    let outcome = checkout_repo.confirm(session.id, true, SECRET).await.unwrap();
    assert!(matches!(outcome, ConfirmOutcome::ReservationExpiredOrInvalid { .. }));

    let order_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE reservation_id = $1")
        .bind(reservation_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(order_count, 0);
}
