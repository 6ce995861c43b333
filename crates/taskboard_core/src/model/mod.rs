//! Board domain model and rank algebra.
//!
//! # Responsibility
//! - Define canonical read models shared by store and services.
//! - Own the rank type and the pure allocation algorithm.
//!
//! # Invariants
//! - Every entity is identified by a stable v4 `Uuid`.
//! - Sibling order is defined only by `Rank` comparison.

pub mod board;
pub mod rank;
