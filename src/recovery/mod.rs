/**
 * INFRASTRUCTURE LAYER - Module Exports
 *
 * Recovery Module: The background worker that expires stale holds and
 * repairs orders left short a ticket
 */

pub mod worker;
