//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate the answer client and card repository into use-case APIs.
//! - Keep the presentation shell decoupled from storage and network details.

pub mod study_service;
