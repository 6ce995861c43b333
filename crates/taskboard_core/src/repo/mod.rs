//! Board store contracts and persistence implementation.
//!
//! # Responsibility
//! - Define the transactional store consumed by board services.
//! - Isolate SQLite query details from ordering orchestration.
//!
//! # Invariants
//! - Store APIs report `RowNotFound` separately from transport errors.
//! - Ordering reads return siblings ascending by rank.

pub mod board_repo;
pub mod sqlite_tx;
