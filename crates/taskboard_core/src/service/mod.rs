//! Board use-case services.
//!
//! # Responsibility
//! - Orchestrate store transactions into board use cases.
//! - Own the reorder and column-delete protocols.
//! - Keep request layers decoupled from storage details.

pub mod board_service;
pub mod columns;
pub mod error;
pub mod locker;
pub mod position;
pub mod reassign;
pub mod request;
pub mod tasks;
