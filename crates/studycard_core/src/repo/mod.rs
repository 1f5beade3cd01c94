//! Card persistence: JSON file store, categorized view and read cache.
//!
//! # Responsibility
//! - Define the card repository contract and its JSON file implementation.
//! - Keep categorization pure and decoupled from file I/O.
//!
//! # Invariants
//! - The file holds one flat array; views are recomputed on every load.
//! - Every save invalidates the injected view cache.

pub mod cache;
pub mod card_store;
pub mod view;
