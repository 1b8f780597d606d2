//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate generation, persistence and reminder delivery.
//! - Own transaction boundaries so repositories stay storage-only.

pub mod reminder_service;
pub mod seed_service;
