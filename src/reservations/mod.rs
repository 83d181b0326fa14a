/**
 * INFRASTRUCTURE LAYER - Module Exports
 *
 * Reservations Module: The hold engine - the single serialisation point
 * that guarantees no tier is oversold
 */

pub mod dto;
pub mod handler;
pub mod repository;
pub mod service;
