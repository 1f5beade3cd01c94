//! Study card domain model.
//!
//! # Responsibility
//! - Define canonical data structures shared by store, search and service.
//!
//! # Invariants
//! - Every card is identified by a stable, store-unique `CardId`.
//! - Deletion is a hard delete; no tombstones are kept.

pub mod card;
