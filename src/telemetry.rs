/**
 * INFRASTRUCTURE LAYER - Telemetry
 *
 * Counters: The scoreboard - process-local counts exposed for operators
 *
 * Architecture Layer: Infrastructure (Layer 6)
 * Responsibility: Cheap, lock-free counters for the handful of events the
 * spec calls out as "contracts with the telemetry collaborator" - queue
 * joins, reservations created, oversell attempts, purchase-limit hits,
 * orders created, confirmations, rate-limit hits, tickets recovered.
 *
 * This is a process-local stand-in for the Prometheus exposition that is
 * explicitly out of scope; a real deployment would wire these into the
 * `metrics` crate instead.
 */

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct Counters {
    pub queue_joins: AtomicU64,
    pub reservations_created: AtomicU64,
    pub oversell_attempts: AtomicU64,
    pub purchase_limit_hits: AtomicU64,
    pub orders_created: AtomicU64,
    pub confirmations_success: AtomicU64,
    pub confirmations_fail: AtomicU64,
    pub rate_limit_hits: AtomicU64,
    pub tickets_recovered: AtomicU64,
}

impl Counters {
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "queue_joins": self.queue_joins.load(Ordering::Relaxed),
            "reservations_created": self.reservations_created.load(Ordering::Relaxed),
            "oversell_attempts": self.oversell_attempts.load(Ordering::Relaxed),
            "purchase_limit_hits": self.purchase_limit_hits.load(Ordering::Relaxed),
            "orders_created": self.orders_created.load(Ordering::Relaxed),
            "confirmations_success": self.confirmations_success.load(Ordering::Relaxed),
            "confirmations_fail": self.confirmations_fail.load(Ordering::Relaxed),
            "rate_limit_hits": self.rate_limit_hits.load(Ordering::Relaxed),
            "tickets_recovered": self.tickets_recovered.load(Ordering::Relaxed),
        })
    }

    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
