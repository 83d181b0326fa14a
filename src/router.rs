/**
 * CONTROLLER LAYER - Route Composition
 *
 * Router: wires repositories, services, and the recovery worker into a
 * single Axum router. Split out of `main` so the integration test suite
 * can build the exact same router the binary serves.
 *
 * Architecture Pattern: Dependency Injection
 * - Repositories depend on database pool / Redis connection manager
 * - Services depend on repositories
 * - Handlers depend on services
 * - Router composes all handlers
 */

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::checkout::handler::CheckoutState;
use crate::reservations::handler::ReservationState;
use crate::waitingroom::handler::WaitingRoomState;
use crate::{checkout, config, events, ratelimit, recovery, reservations, telemetry, tickets, waitingroom};

pub fn build_router(pool: sqlx::PgPool, redis: redis::aio::ConnectionManager, cfg: config::Config) -> Router {
    let counters = Arc::new(telemetry::Counters::default());

    // REPOSITORY LAYER
    let event_repo = events::repository::EventRepository::new(pool.clone());
    let queue_store = waitingroom::store::QueueStore::new(redis.clone());
    let reservation_repo = reservations::repository::ReservationRepository::new(pool.clone());
    let checkout_repo = checkout::repository::CheckoutRepository::new(pool.clone());
    let ticket_repo = tickets::repository::TicketRepository::new(pool.clone());
    let rate_limiter = ratelimit::RateLimiter::new(redis.clone());

    // USE CASE LAYER
    let event_service = Arc::new(events::service::EventService::new(event_repo.clone()));
    let queue_service =
        waitingroom::service::QueueService::new(queue_store, event_repo.clone(), cfg.clone());
    let reservation_service = reservations::service::ReservationService::new(
        reservation_repo,
        queue_service.clone(),
        cfg.per_event_purchase_limit,
        cfg.reservation_ttl_secs as i64,
    );
    let checkout_service = checkout::service::CheckoutService::new(
        checkout_repo,
        ratelimit::RateLimiter::new(redis.clone()),
        cfg.reservation_ttl_secs as i64,
        cfg.qr_signing_secret.clone(),
    );
    let ticket_service = Arc::new(tickets::service::TicketService::new(
        ticket_repo,
        cfg.qr_signing_secret.clone(),
    ));

    // Sole authority for expiring abandoned holds and repairing
    // short-ticketed orders. Runs independent of any request.
    recovery::worker::RecoveryWorker::new(
        pool.clone(),
        cfg.qr_signing_secret.clone(),
        cfg.recovery_interval_secs,
        counters.clone(),
    )
    .spawn();

    // CONTROLLER LAYER: build route groups, each carrying exactly the
    // state its handlers need.

    let event_routes = Router::new()
        .route("/", get(events::handler::list_events))
        .route("/{id}", get(events::handler::get_event))
        .route("/{id}/availability", get(events::handler::get_availability))
        .with_state(event_service.clone());

    let admin_event_routes = Router::new()
        .route("/{id}/pause", post(events::handler::pause_event))
        .route("/{id}/resume", post(events::handler::resume_event))
        .route("/{id}/status", get(events::handler::admin_status))
        .with_state(event_service);

    let waitingroom_state = Arc::new(WaitingRoomState {
        service: queue_service,
        rate_limiter,
        counters: counters.clone(),
    });
    let waitingroom_routes = Router::new()
        .route("/{id}/waiting-room/join", post(waitingroom::handler::join))
        .route("/{id}/waiting-room/status", get(waitingroom::handler::status))
        .with_state(waitingroom_state.clone());

    let admin_waitingroom_routes = Router::new()
        .route("/{id}/waiting-room/clear", post(waitingroom::handler::clear))
        .with_state(waitingroom_state);

    let reservation_state = Arc::new(ReservationState {
        service: reservation_service,
        counters: counters.clone(),
    });
    let reservation_routes = Router::new()
        .route(
            "/{id}/reservations",
            post(reservations::handler::reserve).get(reservations::handler::lookup),
        )
        .with_state(reservation_state);

    let checkout_state = Arc::new(CheckoutState {
        service: checkout_service,
        counters: counters.clone(),
    });
    let checkout_routes = Router::new()
        .route("/sessions", post(checkout::handler::create_session))
        .route("/confirm", post(checkout::handler::confirm))
        .with_state(checkout_state);

    let me_routes = Router::new()
        .route("/tickets", get(tickets::handler::my_tickets))
        .with_state(ticket_service);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let metrics_counters = counters.clone();
    let metrics_route = Router::new().route(
        "/internal/metrics",
        get(move || {
            let counters = metrics_counters.clone();
            async move { axum::Json(counters.snapshot()) }
        }),
    );

    Router::new()
        .route("/health", get(health))
        .merge(metrics_route)
        .nest("/api/v1/events", event_routes)
        .nest("/api/v1/events", waitingroom_routes)
        .nest("/api/v1/events", reservation_routes)
        .nest("/api/v1/admin/events", admin_event_routes)
        .nest("/api/v1/admin/events", admin_waitingroom_routes)
        .nest("/api/v1/checkout", checkout_routes)
        .nest("/api/v1/me", me_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/**
 * Health Check Endpoint
 *
 * Simple health check for load balancers and monitoring
 */
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "service": "ticketgate-core"
    }))
}
