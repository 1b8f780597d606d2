//! Synthetic roster and peer-response generation.
//!
//! # Responsibility
//! - Split a course's students into bounded teams.
//! - Sample high-biased Likert scores.
//! - Build fully formed course records with locally assigned identifiers.
//!
//! # Invariants
//! - All randomness comes from the caller's seeded generator; a fixed seed
//!   and config always yield the same records.
//! - Nothing here touches storage.

pub mod partition;
pub mod roster;
pub mod score;
