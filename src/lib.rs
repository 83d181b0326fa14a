/**
 * INFRASTRUCTURE LAYER - Library Root
 *
 * Exposes every module as a library so both the `ticketgate-core` binary
 * and the integration test suite under `tests/` can build on the same
 * repositories, services, and handlers.
 *
 * Modules:
 * - config: Configuration management
 * - db: Database and cache connection setup
 * - error: Error handling
 * - identity: X-User-Id extraction
 * - ratelimit: Sliding-window request limiting
 * - signing: Ticket QR signature generation/verification
 * - telemetry: Process-local counters
 * - events: Event/tier catalog and admin status
 * - waitingroom: Admission queue and wave cursor
 * - reservations: The oversell-free hold engine
 * - checkout: Idempotent session create/confirm state machine
 * - tickets: A buyer's own issued tickets
 * - recovery: Background worker for stale holds and missing tickets
 */

pub mod checkout;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod identity;
pub mod ratelimit;
pub mod recovery;
pub mod reservations;
pub mod router;
pub mod signing;
pub mod telemetry;
pub mod tickets;
pub mod waitingroom;
