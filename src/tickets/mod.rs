/**
 * INFRASTRUCTURE LAYER - Module Exports
 *
 * Tickets Module: Read-side access to a buyer's own issued tickets
 */

pub mod dto;
pub mod handler;
pub mod repository;
pub mod service;
