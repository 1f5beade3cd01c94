//! Card search entry points.
//!
//! # Responsibility
//! - Expose per-view substring search over loaded cards.
//! - Keep result shaping (filter + ordering) inside core.

pub mod filter;
