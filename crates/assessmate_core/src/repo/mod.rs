//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQL details from generation and reminder orchestration.
//!
//! # Invariants
//! - Repositories borrow a connection (or transaction) and never commit.
//! - Read paths reject unparseable persisted rows with `InvalidData`.

pub mod reminder_repo;
pub mod seed_repo;
