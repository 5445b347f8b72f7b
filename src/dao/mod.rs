//! Thin per-entity query wrappers over the Postgres pool. Handlers own the
//! validation; these functions only move rows.
pub mod accounts;
pub mod customers;
pub mod notifications;
pub mod orders;
pub mod staff;
