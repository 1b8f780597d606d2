//! Roster and assessment domain model.
//!
//! # Responsibility
//! - Define the records produced by the seed generator and persisted by
//!   the seed repository.
//! - Name the eight entity kinds and their purge order.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId`.
//! - Records are immutable once generated; nothing here mutates storage.

pub mod assessment;
pub mod entity;
pub mod roster;

use uuid::Uuid;

/// Stable identifier shared by every persisted record.
pub type RecordId = Uuid;
